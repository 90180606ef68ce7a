mod cleanup;
mod merge;
mod split;
mod strip;
mod tessellate;

pub use cleanup::{Cleanup, CleanupParams};
pub use merge::MergeVertices;
pub(crate) use merge::{cell_of, neighbor_cells, UnionFind};
pub use split::Split;
pub use strip::Strip;
pub use tessellate::Tessellate;
