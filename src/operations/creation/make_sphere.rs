use std::collections::HashMap;

use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::topology::{SurfaceId, TopologyStore};

use super::add_outward;

/// Golden ratio, the long coordinate of the icosahedron vertices.
const PHI: f64 = 1.618_033_988_749_895;

/// Creates a geodesic unit sphere by recursive subdivision of an
/// icosahedron.
///
/// Order 0 is the icosahedron itself; each further order splits every
/// face into four, giving `20 * 4^order` faces. Every new vertex is
/// projected back onto the unit sphere.
pub struct MakeSphere {
    order: u32,
}

impl MakeSphere {
    /// Creates a new `MakeSphere` operation.
    #[must_use]
    pub fn new(order: u32) -> Self {
        Self { order }
    }

    /// Executes the operation, returning a surface held by one handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        let (mut points, mut faces) = icosahedron();
        for _ in 0..self.order {
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
            let mut midpoint = |points: &mut Vec<Vector3>, a: usize, b: usize| {
                *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                    let m = (points[a] + points[b]).normalize();
                    points.push(m);
                    points.len() - 1
                })
            };
            let mut next = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = midpoint(&mut points, a, b);
                let bc = midpoint(&mut points, b, c);
                let ca = midpoint(&mut points, c, a);
                next.extend([[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]);
            }
            faces = next;
        }

        let vertices: Vec<_> = points
            .into_iter()
            .map(|p| store.new_vertex(Point3::from(p)))
            .collect();
        let surface = store.add_surface();
        let center = Point3::origin();
        for tri in faces {
            add_outward(store, surface, tri.map(|i| vertices[i]), &center)?;
        }
        Ok(surface)
    }
}

/// Unit icosahedron with vertices on the coordinate rectangles
/// `(0, ±1, ±φ)`, `(±1, ±φ, 0)` and `(±φ, 0, ±1)`.
fn icosahedron() -> (Vec<Vector3>, Vec<[usize; 3]>) {
    let mut raw = Vec::with_capacity(12);
    for s1 in [-1.0, 1.0] {
        for s2 in [-1.0, 1.0] {
            raw.push(Vector3::new(0.0, s1, s2 * PHI));
            raw.push(Vector3::new(s1, s2 * PHI, 0.0));
            raw.push(Vector3::new(s1 * PHI, 0.0, s2));
        }
    }
    // Faces are the vertex triples at mutual distance 2.
    let adjacent = |i: usize, j: usize| ((raw[i] - raw[j]).norm() - 2.0).abs() < 1e-9;
    let mut faces = Vec::with_capacity(20);
    for i in 0..12 {
        for j in i + 1..12 {
            for k in j + 1..12 {
                if adjacent(i, j) && adjacent(j, k) && adjacent(i, k) {
                    faces.push([i, j, k]);
                }
            }
        }
    }
    let points = raw.iter().map(|v| v.normalize()).collect();
    (points, faces)
}
