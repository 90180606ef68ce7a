use crate::error::{GeometryError, Result};

use super::{Matrix4, Point3, Vector3, TOLERANCE};

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Rotation by `angle` radians around `axis` through the origin, following
/// the right-hand rule.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `axis` has no length.
pub fn rotation(axis: &Vector3, angle: f64) -> Result<Matrix4> {
    let len = axis.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(rotation_matrix(&(axis / len), angle))
}

/// Builds a 4x4 rotation matrix around a unit axis by an angle (Rodrigues).
#[allow(clippy::many_single_char_names)]
fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix4 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[allow(clippy::suspicious_operation_groupings)]
    Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    )
}

/// Non-uniform scaling about the origin.
#[must_use]
pub fn scaling(sx: f64, sy: f64, sz: f64) -> Matrix4 {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Translation by `(dx, dy, dz)`.
#[must_use]
pub fn translation(dx: f64, dy: f64, dz: f64) -> Matrix4 {
    Matrix4::new_translation(&Vector3::new(dx, dy, dz))
}
