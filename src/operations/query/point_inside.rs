use std::f64::consts::PI;

use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore, TriangleId};

/// Tests whether a point lies inside a closed surface.
///
/// The answer follows the surface orientation: with outward normals the
/// interior is inside, and reverting every face turns the surface inside
/// out.
pub struct PointInside {
    point: Point3,
    surface: SurfaceId,
}

impl PointInside {
    /// Creates a new `PointInside` query.
    #[must_use]
    pub fn new(point: Point3, surface: SurfaceId) -> Self {
        Self { point, surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotClosed`] if the surface has a boundary.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool> {
        if !store.is_closed(self.surface)? {
            return Err(TopologyError::NotClosed.into());
        }
        let w = winding_number(store, store.surface_faces(self.surface)?, &self.point)?;
        Ok(w > 0.5)
    }
}

/// Generalized winding number of `faces` around `p`: the sum of the signed
/// solid angles of the faces, divided by `4 pi`.
///
/// Close to an integer for closed surfaces; `1` inside an outward-oriented
/// surface and `0` outside.
pub(crate) fn winding_number(store: &TopologyStore, faces: &[TriangleId], p: &Point3) -> Result<f64> {
    let mut total = 0.0;
    for &f in faces {
        let [a, b, c] = store.triangle_points(f)?;
        total += solid_angle(p, &a, &b, &c);
    }
    Ok(total / (4.0 * PI))
}

/// Signed solid angle subtended by triangle `(a, b, c)` at `p`
/// (Van Oosterom and Strackee).
fn solid_angle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let va = a - p;
    let vb = b - p;
    let vc = c - p;
    let (la, lb, lc) = (va.norm(), vb.norm(), vc.norm());
    let numerator = va.dot(&vb.cross(&vc));
    let denominator = la * lb * lc + va.dot(&vb) * lc + vb.dot(&vc) * la + vc.dot(&va) * lb;
    2.0 * numerator.atan2(denominator)
}
