use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore};

/// Computes the total area of a surface's faces.
pub struct Area {
    surface: SurfaceId,
}

impl Area {
    /// Creates a new `Area` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query, returning the total surface area.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mut total_area = 0.0;
        for &f in store.surface_faces(self.surface)? {
            total_area += store.triangle_area(f)?;
        }
        Ok(total_area)
    }
}
