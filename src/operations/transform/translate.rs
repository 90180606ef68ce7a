use crate::error::Result;
use crate::math::transform::translation;
use crate::math::Vector3;
use crate::topology::{SurfaceId, TopologyStore};

use super::GeneralTransform;

/// Translates a surface by a displacement vector.
pub struct Translate {
    surface: SurfaceId,
    displacement: Vector3,
}

impl Translate {
    /// Creates a new `Translate` operation.
    #[must_use]
    pub fn new(surface: SurfaceId, displacement: Vector3) -> Self {
        Self {
            surface,
            displacement,
        }
    }

    /// Executes the translation, modifying the surface in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let d = self.displacement;
        GeneralTransform::new(self.surface, translation(d.x, d.y, d.z)).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeTetrahedron;
    use crate::operations::query::CenterOfMass;
    use approx::assert_relative_eq;

    #[test]
    fn translation_moves_center_of_mass() {
        let mut store = TopologyStore::new();
        let tet = MakeTetrahedron::new().execute(&mut store).unwrap();
        Translate::new(tet, Vector3::new(5.0, 3.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let c = CenterOfMass::new(tet).execute(&store).unwrap();
        assert_relative_eq!(c.coords, Vector3::new(5.0, 3.0, 2.0), epsilon = 1e-12);
    }
}
