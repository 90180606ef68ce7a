use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::math::predicates::{in_circle, in_rectangle, in_sphere, orientation_3d, orientation_3d_sos};
use crate::math::transform::{rotation, transform_point};
use crate::math::{Point3, Vector3};
use crate::operations::query::{ClosestPoint, PointInside};
use crate::topology::{GeomRef, SurfaceId, TopologyStore, TriangleId};

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity of a [`Point`].
///
/// Identities are handed out in creation order and never reused, which
/// makes them a valid tie-break key for symbolic perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u64);

impl PointId {
    fn next() -> Self {
        Self(NEXT_POINT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identity value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A free-standing position with an identity.
///
/// Equality compares coordinates only. Cloning produces a point with the
/// same coordinates and a fresh identity.
#[derive(Debug)]
pub struct Point {
    id: PointId,
    position: Point3,
}

impl Point {
    /// Creates a point with a new identity.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from(Point3::new(x, y, z))
    }

    /// Identity of this point.
    #[must_use]
    pub fn id(&self) -> PointId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Coordinates as `[x, y, z]`.
    #[must_use]
    pub fn coords(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    /// Moves the point to `(x, y, z)`.
    pub fn set(&mut self, x: f64, y: f64, z: f64) {
        self.position = Point3::new(x, y, z);
    }

    /// Moves the point by `(dx, dy, dz)`.
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.position += Vector3::new(dx, dy, dz);
    }

    /// Scales the coordinates about the origin.
    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        self.position = Point3::new(self.position.x * sx, self.position.y * sy, self.position.z * sz);
    }

    /// Rotates by `angle` radians around `axis` through the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` has zero length.
    pub fn rotate(&mut self, axis: &Vector3, angle: f64) -> Result<()> {
        self.position = transform_point(&rotation(axis, angle)?, &self.position);
        Ok(())
    }

    /// `1` strictly inside the box `lower..upper`, `0` on its boundary,
    /// `-1` outside.
    #[must_use]
    pub fn is_in_rectangle(&self, lower: &Point3, upper: &Point3) -> i32 {
        in_rectangle(&self.position, lower, upper)
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(&self, other: &Point3) -> f64 {
        (self.position - other).norm()
    }

    /// Squared Euclidean distance to another position.
    #[must_use]
    pub fn distance2(&self, other: &Point3) -> f64 {
        (self.position - other).norm_squared()
    }

    /// Sign of the orientation of this point against the plane `a, b, c`.
    #[must_use]
    pub fn orientation_3d(&self, a: &Self, b: &Self, c: &Self) -> i32 {
        orientation_3d(&self.position, &a.position, &b.position, &c.position)
    }

    /// [`orientation_3d`](Self::orientation_3d) with ties broken by identity.
    #[must_use]
    pub fn orientation_3d_sos(&self, a: &Self, b: &Self, c: &Self) -> i32 {
        orientation_3d_sos(
            &self.position,
            &a.position,
            &b.position,
            &c.position,
            [self.id, a.id, b.id, c.id],
        )
    }

    /// `1` inside the xy circle through `a, b, c`, `-1` outside, `0` on it.
    #[must_use]
    pub fn is_in_circle(&self, a: &Point3, b: &Point3, c: &Point3) -> i32 {
        in_circle(&self.position, a, b, c)
    }

    /// `1` inside the sphere through `a, b, c, d`, `-1` outside, `0` on it.
    #[must_use]
    pub fn is_in_sphere(&self, a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> i32 {
        in_sphere(&self.position, a, b, c, d)
    }

    /// [`is_in_circle`](Self::is_in_circle) against a stored triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn is_in_circle_of(&self, store: &TopologyStore, t: TriangleId) -> Result<i32> {
        let [a, b, c] = store.triangle_points(t)?;
        Ok(in_circle(&self.position, &a, &b, &c))
    }

    /// Classifies the point against the xy-projection of a triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn is_in(&self, store: &TopologyStore, t: TriangleId) -> Result<i32> {
        store.point_in_triangle(&self.position, t)
    }

    /// Whether the point lies inside a closed, oriented surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is not closed.
    pub fn is_inside(&self, store: &TopologyStore, surface: SurfaceId) -> Result<bool> {
        PointInside::new(self.position, surface).execute(store)
    }

    /// Distance to a point, vertex, segment or triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist.
    pub fn distance_to(&self, store: &TopologyStore, target: GeomRef) -> Result<f64> {
        Ok(ClosestPoint::new(self.position, target).execute(store)?.distance)
    }

    /// Squared distance to a point, vertex, segment or triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist.
    pub fn distance2_to(&self, store: &TopologyStore, target: GeomRef) -> Result<f64> {
        let nearest = ClosestPoint::new(self.position, target).execute(store)?.point;
        Ok(self.distance2(&nearest))
    }

    /// Writes the point of `target` nearest to this point into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target does not exist.
    pub fn closest(&self, store: &TopologyStore, target: GeomRef, out: &mut Self) -> Result<()> {
        out.position = ClosestPoint::new(self.position, target).execute(store)?.point;
        Ok(())
    }
}

impl From<Point3> for Point {
    fn from(position: Point3) -> Self {
        Self {
            id: PointId::next(),
            position,
        }
    }
}

impl Clone for Point {
    fn clone(&self) -> Self {
        Self::from(self.position)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}
