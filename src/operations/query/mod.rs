mod area;
mod boundary;
mod bounding_box;
mod closest_point;
mod distance;
mod point_inside;
mod self_intersect;
mod stats;
mod volume;

pub use area::Area;
pub use boundary::{Boundary, FanOriented};
pub use bounding_box::BoundingBox;
pub use closest_point::{ClosestPoint, ClosestPointResult};
pub use distance::{SurfaceDistance, SurfaceDistanceResult};
pub use point_inside::PointInside;
pub(crate) use point_inside::winding_number;
pub use self_intersect::{IsSelfIntersecting, SelfIntersections};
pub use stats::{QualityStatistics, QualityStats, Range, SurfaceStatistics, SurfaceStats};
pub use volume::{CenterOfArea, CenterOfMass, Volume};
