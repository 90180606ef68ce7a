use crate::error::Result;
use crate::math::transform::transform_point;
use crate::math::Matrix4;
use crate::topology::{SurfaceId, TopologyStore};

/// Applies an arbitrary 4x4 transformation matrix to every vertex of a
/// surface.
///
/// Vertices shared with other surfaces move too. Face orientation is left
/// untouched, so a mirroring matrix turns the surface inside out.
pub struct GeneralTransform {
    surface: SurfaceId,
    matrix: Matrix4,
}

impl GeneralTransform {
    /// Creates a new `GeneralTransform` operation.
    #[must_use]
    pub fn new(surface: SurfaceId, matrix: Matrix4) -> Self {
        Self { surface, matrix }
    }

    /// Executes the transformation, modifying the surface in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        for v in store.surface_vertices(self.surface)? {
            let moved = transform_point(&self.matrix, &store.point(v)?);
            store.set_point(v, moved)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeCube;
    use crate::operations::query::{BoundingBox, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn identity_transform_preserves_vertices() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        GeneralTransform::new(cube, Matrix4::identity())
            .execute(&mut store)
            .unwrap();
        let bb = BoundingBox::new(cube).execute(&store).unwrap();
        assert_eq!(bb.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn uniform_scale_multiplies_volume() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        GeneralTransform::new(cube, Matrix4::new_scaling(2.0))
            .execute(&mut store)
            .unwrap();
        assert_relative_eq!(Volume::new(cube).execute(&store).unwrap(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn mirroring_inverts_volume_sign() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        let mirror = crate::math::transform::scaling(-1.0, 1.0, 1.0);
        GeneralTransform::new(cube, mirror).execute(&mut store).unwrap();
        assert_relative_eq!(Volume::new(cube).execute(&store).unwrap(), -8.0, epsilon = 1e-9);
    }
}
