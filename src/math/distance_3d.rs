use super::Point3;

/// Closest point to `p` on the segment `[a, b]`.
#[must_use]
pub fn closest_on_segment(p: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on the closed triangle `(a, b, c)`.
///
/// Walks the Voronoi regions of the triangle features, so degenerate
/// (collinear) triangles fall back to the nearest edge.
#[must_use]
pub fn closest_on_triangle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> Point3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return closest_on_segment(p, a, b);
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return closest_on_segment(p, a, c);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return closest_on_segment(p, b, c);
    }

    let sum = va + vb + vc;
    if sum == 0.0 {
        // Degenerate triangle: pick the best of the three edges.
        return [
            closest_on_segment(p, a, b),
            closest_on_segment(p, b, c),
            closest_on_segment(p, c, a),
        ]
        .into_iter()
        .min_by(|x, y| (x - p).norm_squared().total_cmp(&(y - p).norm_squared()))
        .unwrap_or(*a);
    }
    let v = vb / sum;
    let w = vc / sum;
    a + ab * v + ac * w
}

/// Squared distance from `p` to the segment `[a, b]`.
#[must_use]
pub fn point_segment_distance2(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    (p - closest_on_segment(p, a, b)).norm_squared()
}

/// Squared distance from `p` to the triangle `(a, b, c)`.
#[must_use]
pub fn point_triangle_distance2(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> f64 {
    (p - closest_on_triangle(p, a, b, c)).norm_squared()
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
    fn segment_interior_projection() {
        let q = closest_on_segment(&p(0.0, 0.0, 0.0), &p(-1.0, 0.0, -2.0), &p(1.0, 0.0, -2.0));
        assert_relative_eq!(q, p(0.0, 0.0, -2.0));
    }

    #[test]
    fn segment_clamps_to_endpoints() {
        let q = closest_on_segment(&p(5.0, 1.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0));
        assert_relative_eq!(q, p(1.0, 0.0, 0.0));
        assert_relative_eq!(
            point_segment_distance2(&p(5.0, 1.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0)),
            17.0
        );
    }

    #[test]
    fn triangle_face_region() {
        let (a, b, c) = (p(1.0, 0.0, -2.0), p(-1.0, 1.0, -2.0), p(-1.0, -1.0, -2.0));
        let q = closest_on_triangle(&p(0.0, 0.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q, p(0.0, 0.0, -2.0), epsilon = 1e-12);
        assert_relative_eq!(
            point_triangle_distance2(&p(0.0, 0.0, 0.0), &a, &b, &c),
            4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn triangle_vertex_and_edge_regions() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        assert_relative_eq!(closest_on_triangle(&p(-1.0, -1.0, 0.0), &a, &b, &c), a);
        assert_relative_eq!(closest_on_triangle(&p(2.0, -0.5, 1.0), &a, &b, &c), b);
        assert_relative_eq!(
            closest_on_triangle(&p(0.5, -1.0, 0.0), &a, &b, &c),
            p(0.5, 0.0, 0.0)
        );
        assert_relative_eq!(
            closest_on_triangle(&p(1.0, 1.0, 0.0), &a, &b, &c),
            p(0.5, 0.5, 0.0)
        );
    }

    #[test]
    fn collinear_triangle() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let q = closest_on_triangle(&p(1.5, 1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q, p(1.5, 0.0, 0.0));
    }
}
