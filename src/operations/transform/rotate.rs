use crate::error::Result;
use crate::math::transform::{rotation, translation};
use crate::math::{Point3, Vector3};
use crate::topology::{SurfaceId, TopologyStore};

use super::GeneralTransform;

/// Rotates a surface around an axis, following the right-hand rule.
pub struct Rotate {
    surface: SurfaceId,
    axis_origin: Point3,
    axis_direction: Vector3,
    angle: f64,
}

impl Rotate {
    /// Creates a new `Rotate` operation around an axis through the origin.
    ///
    /// * `angle` - Rotation angle in radians.
    #[must_use]
    pub fn new(surface: SurfaceId, axis_direction: Vector3, angle: f64) -> Self {
        Self {
            surface,
            axis_origin: Point3::origin(),
            axis_direction,
            angle,
        }
    }

    /// Moves the rotation axis to pass through `origin`.
    #[must_use]
    pub fn with_origin(mut self, origin: Point3) -> Self {
        self.axis_origin = origin;
        self
    }

    /// Executes the rotation, modifying the surface in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis direction is zero-length.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let o = self.axis_origin.coords;
        // Translate to origin, rotate, translate back
        let matrix = translation(o.x, o.y, o.z)
            * rotation(&self.axis_direction, self.angle)?
            * translation(-o.x, -o.y, -o.z);
        GeneralTransform::new(self.surface, matrix).execute(store)
    }
}
