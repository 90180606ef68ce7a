use crate::error::Result;
use crate::math::distance_3d::{closest_on_segment, closest_on_triangle};
use crate::math::Point3;
use crate::topology::{GeomRef, TopologyStore};

/// Result of a closest point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the target.
    pub point: Point3,
    /// The distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the point of a target (point, vertex, segment or triangle)
/// nearest to a query point.
pub struct ClosestPoint {
    point: Point3,
    target: GeomRef,
}

impl ClosestPoint {
    /// Creates a new `ClosestPoint` query.
    #[must_use]
    pub fn new(point: Point3, target: GeomRef) -> Self {
        Self { point, target }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the target entity is not found.
    pub fn execute(&self, store: &TopologyStore) -> Result<ClosestPointResult> {
        let nearest = match self.target {
            GeomRef::Point(q) => q,
            GeomRef::Vertex(v) => store.point(v)?,
            GeomRef::Segment(s) => {
                let [a, b] = store.segment_points(s)?;
                closest_on_segment(&self.point, &a, &b)
            }
            GeomRef::Triangle(t) => {
                let [a, b, c] = store.triangle_points(t)?;
                closest_on_triangle(&self.point, &a, &b, &c)
            }
        };
        Ok(ClosestPointResult {
            point: nearest,
            distance: (nearest - self.point).norm(),
        })
    }
}
