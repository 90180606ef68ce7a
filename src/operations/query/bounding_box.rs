use crate::error::Result;
use crate::math::Aabb;
use crate::topology::{SurfaceId, TopologyStore};

/// Computes the axis-aligned bounding box of a surface.
pub struct BoundingBox {
    surface: SurfaceId,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query, returning the AABB. An empty surface yields an
    /// empty box.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<Aabb> {
        let mut bb = Aabb::empty();
        for v in store.surface_vertices(self.surface)? {
            bb.include(&store.point(v)?);
        }
        Ok(bb)
    }
}
