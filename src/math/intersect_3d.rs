use super::predicates::{in_triangle_2d, orient2d, orient3d, sign};
use super::Point3;

/// Where a segment meets a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentTriangleHit {
    /// No contact.
    Miss,
    /// The segment lies in the plane of the triangle.
    Coplanar,
    /// Crosses the open interior of the triangle.
    Interior(Point3),
    /// Crosses the relative interior of edge `i` (`0` = ab, `1` = bc, `2` = ca).
    Edge(usize, Point3),
    /// Passes through vertex `i` (`0` = a, `1` = b, `2` = c).
    Vertex(usize),
}

impl SegmentTriangleHit {
    /// Returns the contact point, if the contact is a single point.
    #[must_use]
    pub fn point(&self, tri: [&Point3; 3]) -> Option<Point3> {
        match *self {
            Self::Interior(p) | Self::Edge(_, p) => Some(p),
            Self::Vertex(i) => Some(*tri[i]),
            Self::Miss | Self::Coplanar => None,
        }
    }
}

/// Intersects the closed segment `[p, q]` with the closed triangle `(a, b, c)`.
///
/// Topological decisions are exact (orientation signs); only the returned
/// coordinates of an interior or edge crossing are rounded.
#[must_use]
pub fn segment_triangle(
    p: &Point3,
    q: &Point3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
) -> SegmentTriangleHit {
    let op = orient3d(a, b, c, p);
    let oq = orient3d(a, b, c, q);
    if op == 0.0 && oq == 0.0 {
        return SegmentTriangleHit::Coplanar;
    }
    if sign(op) == sign(oq) {
        return SegmentTriangleHit::Miss;
    }

    let s = [
        sign(orient3d(p, q, a, b)),
        sign(orient3d(p, q, b, c)),
        sign(orient3d(p, q, c, a)),
    ];
    if s.contains(&1) && s.contains(&-1) {
        return SegmentTriangleHit::Miss;
    }

    let point = if op == 0.0 {
        *p
    } else if oq == 0.0 {
        *q
    } else {
        let t = op / (op - oq);
        p + (q - p) * t
    };

    match (s[0] == 0, s[1] == 0, s[2] == 0) {
        (false, false, false) => SegmentTriangleHit::Interior(point),
        (true, false, false) => SegmentTriangleHit::Edge(0, point),
        (false, true, false) => SegmentTriangleHit::Edge(1, point),
        (false, false, true) => SegmentTriangleHit::Edge(2, point),
        (true, false, true) => SegmentTriangleHit::Vertex(0),
        (true, true, false) => SegmentTriangleHit::Vertex(1),
        (false, true, true) => SegmentTriangleHit::Vertex(2),
        // Only reachable for a collinear triangle.
        (true, true, true) => SegmentTriangleHit::Miss,
    }
}

/// Drops the coordinate along which the triangle normal is largest, so a
/// coplanar configuration can be decided with 2D predicates.
#[must_use]
pub fn project_to_dominant_plane(normal: &super::Vector3, p: &Point3) -> Point3 {
    let n = normal.abs();
    if n.x >= n.y && n.x >= n.z {
        Point3::new(p.y, p.z, 0.0)
    } else if n.y >= n.z {
        Point3::new(p.z, p.x, 0.0)
    } else {
        Point3::new(p.x, p.y, 0.0)
    }
}

/// Classifies two segments projected on the xy-plane.
///
/// Returns `1` if they cross at a point interior to both, `0` if they touch
/// (an endpoint lies on the other segment, or they overlap collinearly) and
/// `-1` if they are disjoint.
#[must_use]
pub fn segments_intersect_2d(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> i32 {
    let o1 = sign(orient2d(a, b, c));
    let o2 = sign(orient2d(a, b, d));
    let o3 = sign(orient2d(c, d, a));
    let o4 = sign(orient2d(c, d, b));

    if o1 * o2 < 0 && o3 * o4 < 0 {
        return 1;
    }
    let touches = (o1 == 0 && on_segment_2d(c, a, b))
        || (o2 == 0 && on_segment_2d(d, a, b))
        || (o3 == 0 && on_segment_2d(a, c, d))
        || (o4 == 0 && on_segment_2d(b, c, d));
    if touches {
        0
    } else {
        -1
    }
}

/// For `p` collinear with `a`, `b`: is it inside their bounding box?
fn on_segment_2d(p: &Point3, a: &Point3, b: &Point3) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment against closed triangle, all four points coplanar.
fn coplanar_segment_triangle(p: &Point3, q: &Point3, tri: [&Point3; 3]) -> bool {
    let normal = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    if normal.norm_squared() == 0.0 {
        return false;
    }
    let pp = project_to_dominant_plane(&normal, p);
    let qq = project_to_dominant_plane(&normal, q);
    let t = tri.map(|v| project_to_dominant_plane(&normal, v));
    if in_triangle_2d(&pp, &t[0], &t[1], &t[2]) >= 0 || in_triangle_2d(&qq, &t[0], &t[1], &t[2]) >= 0
    {
        return true;
    }
    (0..3).any(|i| segments_intersect_2d(&pp, &qq, &t[i], &t[(i + 1) % 3]) >= 0)
}

/// Closed segment against closed triangle, including coplanar contact.
#[must_use]
pub fn segment_touches_triangle(p: &Point3, q: &Point3, tri: [&Point3; 3]) -> bool {
    match segment_triangle(p, q, tri[0], tri[1], tri[2]) {
        SegmentTriangleHit::Miss => false,
        SegmentTriangleHit::Coplanar => coplanar_segment_triangle(p, q, tri),
        _ => true,
    }
}

/// Do the two closed triangles share at least one point?
#[must_use]
pub fn triangles_touch(t1: [&Point3; 3], t2: [&Point3; 3]) -> bool {
    (0..3).any(|i| segment_touches_triangle(t1[i], t1[(i + 1) % 3], t2))
        || (0..3).any(|i| segment_touches_triangle(t2[i], t2[(i + 1) % 3], t1))
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
    fn segment_crosses_interior() {
        let (a, b, c) = (p(1.0, 0.0, 1.0), p(-1.0, 1.0, 1.0), p(-1.0, -1.0, 1.0));
        let hit = segment_triangle(&p(0.0, 0.0, 2.0), &p(0.0, 0.0, 0.0), &a, &b, &c);
        let SegmentTriangleHit::Interior(q) = hit else {
            panic!("expected interior hit, got {hit:?}");
        };
        assert_relative_eq!(q, p(0.0, 0.0, 1.0));
    }

    #[test]
    fn segment_through_vertex() {
        let (a, b, c) = (p(1.0, 0.0, 1.0), p(-1.0, 1.0, 1.0), p(-1.0, -1.0, 1.0));
        let hit = segment_triangle(&p(1.0, 0.0, 2.0), &p(1.0, 0.0, 0.0), &a, &b, &c);
        assert_eq!(hit, SegmentTriangleHit::Vertex(0));
    }

    #[test]
    fn segment_through_edge() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0));
        let hit = segment_triangle(&p(1.0, 0.0, 1.0), &p(1.0, 0.0, -1.0), &a, &b, &c);
        assert!(matches!(hit, SegmentTriangleHit::Edge(0, _)));
    }

    #[test]
    fn coplanar_and_missing_segments() {
        let (a, b, c) = (p(1.0, 0.0, 1.0), p(-1.0, 1.0, 1.0), p(-1.0, -1.0, 1.0));
        assert_eq!(
            segment_triangle(&p(1.0, 0.0, 1.0), &p(-1.0, 0.0, 1.0), &a, &b, &c),
            SegmentTriangleHit::Coplanar
        );
        assert_eq!(
            segment_triangle(&p(5.0, 0.0, 2.0), &p(5.0, 0.0, 0.0), &a, &b, &c),
            SegmentTriangleHit::Miss
        );
        assert_eq!(
            segment_triangle(&p(0.0, 0.0, 3.0), &p(0.0, 0.0, 2.0), &a, &b, &c),
            SegmentTriangleHit::Miss
        );
    }

    #[test]
    fn planar_segment_classification() {
        let s1 = (p(0.0, -1.0, 0.0), p(0.0, 1.0, 0.0));
        let crossing = (p(-1.0, 0.0, 1.0), p(1.0, 0.0, 1.0));
        let far = (p(-3.0, 0.0, 1.0), p(-2.0, 0.0, 1.0));
        let touching = (p(-1.0, -1.0, 0.0), p(1.0, -1.0, 0.0));
        assert_eq!(segments_intersect_2d(&s1.0, &s1.1, &crossing.0, &crossing.1), 1);
        assert_eq!(segments_intersect_2d(&s1.0, &s1.1, &far.0, &far.1), -1);
        assert_eq!(segments_intersect_2d(&s1.0, &s1.1, &touching.0, &touching.1), 0);
        assert_eq!(segments_intersect_2d(&touching.0, &touching.1, &s1.0, &s1.1), 0);
    }

    #[test]
    fn triangles_touching_along_interior_chord() {
        let f = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let g = [p(0.0, 0.0, 1.0), p(0.5, 0.0, -1.0), p(0.5, 0.5, 0.0)];
        assert!(triangles_touch([&f[0], &f[1], &f[2]], [&g[0], &g[1], &g[2]]));
        let h = [p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(0.0, 1.0, 1.0)];
        assert!(!triangles_touch([&f[0], &f[1], &f[2]], [&h[0], &h[1], &h[2]]));
    }

    #[test]
    fn coplanar_overlap_is_detected() {
        let f = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let g = [p(0.2, 0.2, 0.0), p(0.5, 0.2, 0.0), p(0.2, 0.5, 0.0)];
        assert!(triangles_touch([&f[0], &f[1], &f[2]], [&g[0], &g[1], &g[2]]));
    }
}
