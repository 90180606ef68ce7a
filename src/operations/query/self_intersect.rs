use crate::error::Result;
use crate::math::intersect_3d::{project_to_dominant_plane, segment_touches_triangle, triangles_touch};
use crate::math::predicates::{orient2d, orient3d, sign};
use crate::math::{Aabb, Point3};
use crate::topology::{SurfaceId, TopologyStore, TriangleId, VertexId};

/// Tests whether any two faces of a surface intersect other than along
/// the edges and vertices they share.
pub struct IsSelfIntersecting {
    surface: SurfaceId,
}

impl IsSelfIntersecting {
    /// Creates a new `IsSelfIntersecting` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool> {
        Ok(!SelfIntersections::new(self.surface).execute(store)?.is_empty())
    }
}

/// Lists every pair of faces of a surface that improperly intersect.
pub struct SelfIntersections {
    surface: SurfaceId,
}

impl SelfIntersections {
    /// Creates a new `SelfIntersections` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<(TriangleId, TriangleId)>> {
        let faces = store.surface_faces(self.surface)?;
        let mut items = Vec::with_capacity(faces.len());
        for &f in faces {
            let vs = store.triangle_vertices(f)?;
            let ps = store.triangle_points(f)?;
            items.push((f, vs, ps, Aabb::from_points(&ps)));
        }
        // Sweep along x so only overlapping boxes are tested.
        items.sort_by(|a, b| a.3.min.x.total_cmp(&b.3.min.x));

        let mut pairs = Vec::new();
        for i in 0..items.len() {
            let (fi, vi, pi, bi) = &items[i];
            for (fj, vj, pj, bj) in &items[i + 1..] {
                if bj.min.x > bi.max.x {
                    break;
                }
                if bi.overlaps(bj) && faces_intersect((vi, pi), (vj, pj)) {
                    pairs.push((*fi, *fj));
                }
            }
        }
        Ok(pairs)
    }
}

/// Decides whether two triangles meet anywhere besides their shared
/// vertices and edge.
fn faces_intersect(t1: (&[VertexId; 3], &[Point3; 3]), t2: (&[VertexId; 3], &[Point3; 3])) -> bool {
    let (v1, p1) = t1;
    let (v2, p2) = t2;
    let shared: Vec<(usize, usize)> = (0..3)
        .filter_map(|i| v2.iter().position(|&w| w == v1[i]).map(|j| (i, j)))
        .collect();
    let r1 = [&p1[0], &p1[1], &p1[2]];
    let r2 = [&p2[0], &p2[1], &p2[2]];
    match shared[..] {
        [] => triangles_touch(r1, r2),
        [(i, j)] => {
            let (a1, b1) = (&p1[(i + 1) % 3], &p1[(i + 2) % 3]);
            let (a2, b2) = (&p2[(j + 1) % 3], &p2[(j + 2) % 3]);
            segment_touches_triangle(a1, b1, r2) || segment_touches_triangle(a2, b2, r1)
        }
        [(i0, j0), (i1, _)] => {
            let apex1 = &p1[3 - i0 - i1];
            let apex2 = &p2[(0..3).find(|&k| k != j0 && v2[k] != v1[i1]).unwrap_or(0)];
            let (a, b) = (&p1[i0], &p1[i1]);
            if orient3d(a, b, apex1, apex2) != 0.0 {
                return false;
            }
            let normal = (b - a).cross(&(apex1 - a));
            let pa = project_to_dominant_plane(&normal, a);
            let pb = project_to_dominant_plane(&normal, b);
            let s1 = sign(orient2d(&pa, &pb, &project_to_dominant_plane(&normal, apex1)));
            let s2 = sign(orient2d(&pa, &pb, &project_to_dominant_plane(&normal, apex2)));
            s1 * s2 > 0
        }
        _ => false,
    }
}
