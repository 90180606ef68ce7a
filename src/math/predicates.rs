//! Exact-sign geometric predicates.
//!
//! The floating-point kernels come from the `robust` crate (adaptive
//! precision arithmetic), so every sign returned here is exact for the
//! given double coordinates. Functions suffixed `_sos` additionally apply
//! Simulation of Simplicity: a symbolic perturbation keyed on point
//! identity that turns every exactly-degenerate configuration into a
//! consistent non-zero answer.

use std::sync::OnceLock;

use robust::{Coord, Coord3D};

use super::Point3;

/// Twice the signed area of the triangle `(a, b, c)` projected on the
/// xy-plane. Positive when counter-clockwise seen from `+z`.
#[must_use]
pub fn orient2d(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    robust::orient2d(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
    )
}

/// Six times the signed volume of the tetrahedron `(a, b, c, d)`.
///
/// Positive when `d` lies below the plane through `a`, `b`, `c`, where
/// those three appear counter-clockwise seen from above.
#[must_use]
pub fn orient3d(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    robust::orient3d(
        Coord3D { x: a.x, y: a.y, z: a.z },
        Coord3D { x: b.x, y: b.y, z: b.z },
        Coord3D { x: c.x, y: c.y, z: c.z },
        Coord3D { x: d.x, y: d.y, z: d.z },
    )
}

/// Raw in-circle determinant on the xy-plane; positive when `d` is inside
/// the circle through counter-clockwise `a`, `b`, `c`.
#[must_use]
pub fn incircle(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    robust::incircle(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
        Coord { x: d.x, y: d.y },
    )
}

/// Raw in-sphere determinant; positive when `e` is inside the sphere
/// through positively oriented `a`, `b`, `c`, `d`.
#[must_use]
pub fn insphere(a: &Point3, b: &Point3, c: &Point3, d: &Point3, e: &Point3) -> f64 {
    robust::insphere(
        Coord3D { x: a.x, y: a.y, z: a.z },
        Coord3D { x: b.x, y: b.y, z: b.z },
        Coord3D { x: c.x, y: c.y, z: c.z },
        Coord3D { x: d.x, y: d.y, z: d.z },
        Coord3D { x: e.x, y: e.y, z: e.z },
    )
}

/// Sign of a determinant as `-1`, `0` or `1`.
#[must_use]
pub fn sign(value: f64) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Orientation of `p` against the plane through `a`, `b`, `c`.
///
/// Returns `1` when `p` lies below the plane (on the side opposite to the
/// normal `(b - a) x (c - a)`), `-1` above it and `0` exactly on it.
#[must_use]
pub fn orientation_3d(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> i32 {
    sign(orient3d(a, b, c, p))
}

/// [`orientation_3d`] under Simulation of Simplicity.
///
/// `keys` are the identities of `p`, `a`, `b`, `c` in that order. When the
/// four points are exactly coplanar the tie is broken by a perturbation
/// that depends only on the relative order of the keys, so the answer is
/// reproducible and antisymmetric under exchanging any two arguments.
/// Returns `0` only if two of the keys are equal.
#[must_use]
pub fn orientation_3d_sos<K: Ord>(
    p: &Point3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
    keys: [K; 4],
) -> i32 {
    let exact = sign(orient3d(a, b, c, p));
    if exact != 0 {
        return exact;
    }

    // Matrix rows are (a, b, c, p); reorder the keys to match.
    let [kp, ka, kb, kc] = keys;
    let row_keys = [ka, kb, kc, kp];
    let rows = [a, b, c, p];

    let mut order = [0usize, 1, 2, 3];
    let mut swaps = 0u32;
    for i in 1..4 {
        let mut j = i;
        while j > 0 && row_keys[order[j - 1]] > row_keys[order[j]] {
            order.swap(j - 1, j);
            swaps += 1;
            j -= 1;
        }
    }
    if (1..4).any(|i| row_keys[order[i - 1]] == row_keys[order[i]]) {
        return 0;
    }

    let m: [[f64; 3]; 4] = order.map(|r| [rows[r].x, rows[r].y, rows[r].z]);
    let parity = if swaps % 2 == 0 { 1 } else { -1 };

    for term in sos_terms() {
        let value = term.minor_sign(&m);
        if value != 0 {
            return parity * term.sign * value;
        }
    }
    0
}

/// One monomial of the perturbed 4x4 determinant.
#[derive(Debug, Clone)]
struct SosTerm {
    /// Perturbed cells `(row, column)` sorted by row.
    cells: Vec<(usize, usize)>,
    /// Laplace sign times the sign of the row-to-column matching.
    sign: i32,
    /// Sum of `2^(3 * row - column + 2)` over the cells; smaller is more significant.
    weight: u32,
}

impl SosTerm {
    /// Sign of the complementary minor.
    fn minor_sign(&self, m: &[[f64; 3]; 4]) -> i32 {
        let rows: Vec<usize> = (0..4)
            .filter(|r| !self.cells.iter().any(|&(cr, _)| cr == *r))
            .collect();
        let cols: Vec<usize> = (0..3)
            .filter(|c| !self.cells.iter().any(|&(_, cc)| cc == *c))
            .collect();
        match self.cells.len() {
            1 => {
                let (u, v) = (cols[0], cols[1]);
                sign(robust::orient2d(
                    Coord { x: m[rows[0]][u], y: m[rows[0]][v] },
                    Coord { x: m[rows[1]][u], y: m[rows[1]][v] },
                    Coord { x: m[rows[2]][u], y: m[rows[2]][v] },
                ))
            }
            2 => {
                let c = cols[0];
                let (x0, x1) = (m[rows[0]][c], m[rows[1]][c]);
                if x0 > x1 {
                    1
                } else if x0 < x1 {
                    -1
                } else {
                    0
                }
            }
            _ => 1,
        }
    }
}

/// All non-empty partial matchings of the four rows onto the x, y, z
/// columns, ordered by decreasing significance.
fn sos_terms() -> &'static [SosTerm] {
    static TERMS: OnceLock<Vec<SosTerm>> = OnceLock::new();
    TERMS.get_or_init(|| {
        let mut terms = Vec::with_capacity(72);
        // Each row is either unperturbed (3) or takes one of columns 0..3.
        for code in 0..256u32 {
            let assign: [usize; 4] = [0u32, 1, 2, 3].map(|r| ((code >> (2 * r)) & 3) as usize);
            let cells: Vec<(usize, usize)> = assign
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c < 3)
                .map(|(r, &c)| (r, c))
                .collect();
            if cells.is_empty() || cells.len() > 3 {
                continue;
            }
            let mut used = [false; 3];
            if cells.iter().any(|&(_, c)| std::mem::replace(&mut used[c], true)) {
                continue;
            }

            let inversions = cells
                .iter()
                .enumerate()
                .flat_map(|(i, a)| cells[i + 1..].iter().map(move |b| (a.1, b.1)))
                .filter(|(ca, cb)| ca > cb)
                .count();
            let index_sum: usize = cells.iter().map(|&(r, c)| r + c).sum();
            let sign = if (inversions + index_sum) % 2 == 0 { 1 } else { -1 };
            #[allow(clippy::cast_possible_truncation)]
            let weight = cells
                .iter()
                .map(|&(r, c)| 1u32 << (3 * r as u32 + 2 - c as u32))
                .sum();
            terms.push(SosTerm { cells, sign, weight });
        }
        terms.sort_by_key(|t| t.weight);
        terms
    })
}

/// Position of `p` relative to the circle through `a`, `b`, `c` in the
/// xy-plane: `1` inside, `-1` outside, `0` on the circle.
///
/// The answer does not depend on the winding of `a`, `b`, `c`. Collinear
/// `a`, `b`, `c` describe no circle and yield `0`.
#[must_use]
pub fn in_circle(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> i32 {
    sign(incircle(a, b, c, p)) * sign(orient2d(a, b, c))
}

/// Position of `p` relative to the sphere through `a`, `b`, `c`, `d`:
/// `1` inside, `-1` outside, `0` on the sphere.
///
/// The answer does not depend on the orientation of `a`, `b`, `c`, `d`.
/// Coplanar `a`, `b`, `c`, `d` describe no sphere and yield `0`.
#[must_use]
pub fn in_sphere(p: &Point3, a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> i32 {
    sign(insphere(a, b, c, d, p)) * sign(orient3d(a, b, c, d))
}

/// Classifies `p` against the box spanned by `lower` and `upper`.
///
/// Returns `1` when `lower < p < upper` on every axis, `0` when `p` lies on
/// the boundary of the box spanned by the two corners, `-1` otherwise.
#[must_use]
pub fn in_rectangle(p: &Point3, lower: &Point3, upper: &Point3) -> i32 {
    if (0..3).all(|i| p[i] > lower[i] && p[i] < upper[i]) {
        return 1;
    }
    let inside_closed = (0..3).all(|i| {
        let (lo, hi) = (lower[i].min(upper[i]), lower[i].max(upper[i]));
        p[i] >= lo && p[i] <= hi
    });
    let on_face = (0..3).any(|i| p[i] == lower[i] || p[i] == upper[i]);
    if inside_closed && on_face {
        0
    } else {
        -1
    }
}

/// Position of `p` relative to triangle `(a, b, c)` projected on the
/// xy-plane: positive inside, `0` on an edge, negative outside.
#[must_use]
pub fn in_triangle_2d(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> i32 {
    let orientation = sign(orient2d(a, b, c));
    if orientation == 0 {
        return -1;
    }
    let s = [
        sign(orient2d(a, b, p)) * orientation,
        sign(orient2d(b, c, p)) * orientation,
        sign(orient2d(c, a, p)) * orientation,
    ];
    if s.contains(&-1) {
        -1
    } else if s.contains(&0) {
        0
    } else {
        1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn orientation_sign_convention() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        assert_eq!(orientation_3d(&p(0.0, 0.0, 0.0), &a, &b, &c), 0);
        assert_eq!(orientation_3d(&p(0.0, 0.0, 1.0), &a, &b, &c), -1);
        assert_eq!(orientation_3d(&p(0.0, 0.0, -1.0), &a, &b, &c), 1);
        assert_eq!(orientation_3d(&p(0.0, 0.0, 1.0), &a, &c, &b), 1);
    }

    #[test]
    fn orientation_is_exact_near_degeneracy() {
        // Coplanar within double precision: naive evaluation gives noise.
        let a = p(0.1, 0.1, 0.1);
        let b = p(0.2, 0.2, 0.2);
        let c = p(0.3, 0.3, 0.3 + 1e-17);
        let d = p(0.7, 0.1, 0.9);
        let s1 = orientation_3d(&d, &a, &b, &c);
        let s2 = orientation_3d(&d, &b, &a, &c);
        assert_eq!(s1, -s2);
    }

    #[test]
    fn sos_matches_exact_when_non_degenerate() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        assert_eq!(orientation_3d_sos(&p(0.0, 0.0, 1.0), &a, &b, &c, [0, 1, 2, 3]), -1);
        assert_eq!(orientation_3d_sos(&p(0.0, 0.0, -1.0), &a, &b, &c, [0, 1, 2, 3]), 1);
        assert_eq!(orientation_3d_sos(&p(0.0, 0.0, 1.0), &a, &c, &b, [0, 1, 3, 2]), 1);
    }

    #[test]
    fn sos_resolves_coplanar_points() {
        let pts = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
        ];
        let s = orientation_3d_sos(&pts[3], &pts[0], &pts[1], &pts[2], [3, 0, 1, 2]);
        assert_ne!(s, 0);
        // Swapping two arguments, keys included, flips the answer.
        let t = orientation_3d_sos(&pts[3], &pts[1], &pts[0], &pts[2], [3, 1, 0, 2]);
        assert_eq!(s, -t);
        let u = orientation_3d_sos(&pts[0], &pts[3], &pts[1], &pts[2], [0, 3, 1, 2]);
        assert_eq!(s, -u);
    }

    #[test]
    fn sos_resolves_coincident_points() {
        let q = p(0.5, 0.5, 0.5);
        let s = orientation_3d_sos(&q, &q, &q, &q, [4, 1, 2, 3]);
        assert_ne!(s, 0);
        let t = orientation_3d_sos(&q, &q, &q, &q, [4, 2, 1, 3]);
        assert_eq!(s, -t);
    }

    #[test]
    fn sos_is_zero_for_repeated_identity() {
        let q = p(0.5, 0.5, 0.5);
        assert_eq!(orientation_3d_sos(&q, &q, &q, &q, [1, 1, 2, 3]), 0);
    }

    #[test]
    fn sos_term_table_is_complete() {
        let terms = sos_terms();
        assert_eq!(terms.len(), 72);
        assert!(terms.windows(2).all(|w| w[0].weight < w[1].weight));
    }

    #[test]
    fn in_circle_ignores_winding() {
        let (a, b, c) = (p(1.0, 0.0, 0.0), p(-1.0, 1.0, 0.0), p(-1.0, -1.0, 0.0));
        assert_eq!(in_circle(&p(0.0, 0.0, 0.0), &a, &b, &c), 1);
        assert_eq!(in_circle(&p(0.0, 0.0, 0.0), &a, &c, &b), 1);
        assert_eq!(in_circle(&p(2.0, 0.0, 0.0), &a, &b, &c), -1);
        assert_eq!(in_circle(&a, &a, &b, &c), 0);
    }

    #[test]
    fn in_sphere_ignores_orientation() {
        let (a, b, c, d) = (
            p(1.0, 0.0, 0.0),
            p(-1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        );
        assert_eq!(in_sphere(&p(0.0, 0.0, 0.0), &a, &b, &c, &d), 1);
        assert_eq!(in_sphere(&p(0.0, 0.0, 0.0), &b, &a, &c, &d), 1);
        assert_eq!(in_sphere(&p(0.0, 0.0, 2.0), &a, &b, &c, &d), -1);
        assert_eq!(in_sphere(&p(0.0, -1.0, 0.0), &a, &b, &c, &d), 0);
    }

    #[test]
    fn rectangle_classification() {
        let (p1, p2, p3) = (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(0.5, 0.5, 0.5));
        assert_eq!(in_rectangle(&p1, &p1, &p2), 0);
        assert_eq!(in_rectangle(&p1, &p2, &p1), 0);
        assert_eq!(in_rectangle(&p3, &p1, &p2), 1);
        assert_eq!(in_rectangle(&p3, &p2, &p1), -1);
        assert_eq!(in_rectangle(&p1, &p2, &p3), -1);
        assert_eq!(in_rectangle(&p2, &p1, &p3), -1);
    }

    #[test]
    fn point_in_triangle_2d() {
        let (a, b, c) = (p(1.0, 0.0, 0.0), p(-1.0, 1.0, 0.0), p(-1.0, -1.0, 0.0));
        assert!(in_triangle_2d(&p(0.0, 0.0, 5.0), &a, &b, &c) > 0);
        assert!(in_triangle_2d(&p(2.0, 0.0, 0.0), &a, &b, &c) < 0);
        assert_eq!(in_triangle_2d(&a, &a, &b, &c), 0);
    }
}
