use crate::error::Result;
use crate::math::transform::{scaling, translation};
use crate::math::{Point3, Vector3};
use crate::topology::{SurfaceId, TopologyStore};

use super::GeneralTransform;

/// Scales a surface per axis about a center point (the origin by default).
pub struct Scale {
    surface: SurfaceId,
    center: Point3,
    factors: Vector3,
}

impl Scale {
    /// Creates a new `Scale` operation.
    #[must_use]
    pub fn new(surface: SurfaceId, factors: Vector3) -> Self {
        Self {
            surface,
            center: Point3::origin(),
            factors,
        }
    }

    /// Sets the fixed point of the scaling.
    #[must_use]
    pub fn with_center(mut self, center: Point3) -> Self {
        self.center = center;
        self
    }

    /// Executes the scaling, modifying the surface in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let c = self.center.coords;
        let f = self.factors;
        let matrix = translation(c.x, c.y, c.z) * scaling(f.x, f.y, f.z) * translation(-c.x, -c.y, -c.z);
        GeneralTransform::new(self.surface, matrix).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeCube;
    use crate::operations::query::{BoundingBox, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn non_uniform_scale() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        Scale::new(cube, Vector3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_relative_eq!(Volume::new(cube).execute(&store).unwrap(), 48.0, epsilon = 1e-9);
    }

    #[test]
    fn scale_about_corner_keeps_corner() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        Scale::new(cube, Vector3::new(0.5, 0.5, 0.5))
            .with_center(Point3::new(-1.0, -1.0, -1.0))
            .execute(&mut store)
            .unwrap();
        let bb = BoundingBox::new(cube).execute(&store).unwrap();
        assert_relative_eq!(bb.min, Point3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(bb.max, Point3::new(0.0, 0.0, 0.0));
    }
}
