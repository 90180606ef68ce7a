use crate::error::Result;
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore};

use super::add_outward;

/// Creates the regular tetrahedron with vertices `(1,1,1)`, `(-1,-1,1)`,
/// `(-1,1,-1)` and `(1,-1,-1)`, faces oriented outward.
#[derive(Debug, Default)]
pub struct MakeTetrahedron;

impl MakeTetrahedron {
    /// Creates a new `MakeTetrahedron` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, returning a surface held by one handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        let v = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
        ]
        .map(|p| store.new_vertex(p));
        let surface = store.add_surface();
        let center = Point3::origin();
        for tri in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
            add_outward(store, surface, tri.map(|i| v[i]), &center)?;
        }
        Ok(surface)
    }
}
