pub mod error;
pub mod geometry;
pub mod io;
pub mod isosurface;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{Result, TrisurfError};
