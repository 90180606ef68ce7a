pub mod aabb;
pub mod bvh;
pub mod distance_3d;
pub mod intersect_3d;
pub mod predicates;
pub mod transform;

pub use aabb::Aabb;
pub use bvh::Bvh;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 matrix type for affine transformations.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
