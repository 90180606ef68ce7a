use super::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns an inverted box that any point will grow.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Builds the tightest box around `points`.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.include(p);
        }
        bb
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Returns `true` if no point was ever included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Checks whether two boxes overlap, boundaries included.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns a copy enlarged by `margin` on every side.
    #[must_use]
    pub fn inflated(&self, margin: f64) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Squared distance from `p` to the box, zero inside.
    #[must_use]
    pub fn distance2(&self, p: &Point3) -> f64 {
        let mut d = 0.0;
        for i in 0..3 {
            let v = if p[i] < self.min[i] {
                self.min[i] - p[i]
            } else if p[i] > self.max[i] {
                p[i] - self.max[i]
            } else {
                0.0
            };
            d += v * v;
        }
        d
    }

    /// Largest absolute coordinate over both corners.
    #[must_use]
    pub fn max_abs_coord(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.min.coords.amax().max(self.max.coords.amax())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn from_points_and_diagonal() {
        let bb = Aabb::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 2.0, 2.0)]);
        assert_relative_eq!(bb.diagonal(), 3.0);
        assert_eq!(bb.center(), p(0.5, 1.0, 1.0));
    }

    #[test]
    fn empty_box_has_no_extent() {
        let bb = Aabb::empty();
        assert!(bb.is_empty());
        assert_relative_eq!(bb.diagonal(), 0.0);
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Aabb::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]);
        let b = Aabb::from_points(&[p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)]);
        let c = Aabb::from_points(&[p(1.5, 0.0, 0.0), p(2.0, 1.0, 1.0)]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn distance_to_box() {
        let bb = Aabb::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]);
        assert_relative_eq!(bb.distance2(&p(0.5, 0.5, 0.5)), 0.0);
        assert_relative_eq!(bb.distance2(&p(3.0, 0.5, 0.5)), 4.0);
    }
}
