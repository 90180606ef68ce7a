use crate::error::{OperationError, Result, TopologyError};
use crate::topology::{SegmentId, SurfaceId, TopologyStore, VertexId};

/// Collects the edges bounding exactly one face of a surface.
pub struct Boundary {
    surface: SurfaceId,
}

impl Boundary {
    /// Creates a new `Boundary` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<SegmentId>> {
        let mut out = Vec::new();
        for e in store.surface_edges(self.surface)? {
            if store.is_boundary_edge(e, self.surface)? {
                out.push(e);
            }
        }
        Ok(out)
    }
}

/// Orders the outer edges of the faces fanning around a vertex.
///
/// For every face of the surface around `vertex`, the edge opposite the
/// vertex is reported; consecutive edges share a vertex and follow the
/// orientation of the faces (counter-clockwise seen from the front).
pub struct FanOriented {
    surface: SurfaceId,
    vertex: VertexId,
}

impl FanOriented {
    /// Creates a new `FanOriented` query.
    #[must_use]
    pub fn new(surface: SurfaceId, vertex: VertexId) -> Self {
        Self { surface, vertex }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotOriented`] if the surface is not
    /// consistently oriented.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<SegmentId>> {
        if !store.is_orientable(self.surface)? {
            return Err(TopologyError::NotOriented.into());
        }
        let v = self.vertex;

        // (from, to, edge) of each outer edge, following face orientation.
        let mut links = Vec::new();
        for f in store.vertex_faces(v, Some(self.surface))? {
            let [a, b, c] = store.triangle_vertices(f)?;
            let (from, to) = if a == v {
                (b, c)
            } else if b == v {
                (c, a)
            } else {
                (a, b)
            };
            links.push((from, to, store.opposite_edge(f, v)?));
        }
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let start = links
            .iter()
            .position(|&(from, _, _)| !links.iter().any(|&(_, to, _)| to == from))
            .unwrap_or(0);
        let mut used = vec![false; links.len()];
        let mut out = Vec::with_capacity(links.len());
        let mut current = start;
        loop {
            used[current] = true;
            out.push(links[current].2);
            let tip = links[current].1;
            match (0..links.len()).find(|&j| !used[j] && links[j].0 == tip) {
                Some(next) => current = next,
                None => break,
            }
        }
        if out.len() != links.len() {
            return Err(OperationError::Failed(
                "faces around the vertex do not form a single fan".into(),
            )
            .into());
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeTetrahedron;
    use crate::topology::TriangleInput;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    struct Fan {
        store: TopologyStore,
        v: [VertexId; 5],
        e: [SegmentId; 8],
        f: [crate::topology::TriangleId; 4],
    }

    //         v4
    //      e3 e4 e5
    //   v1 e1 v2 e2 v3
    //      e6 e7 e8
    //         v5
    fn fan() -> Fan {
        let mut store = TopologyStore::new();
        let v = [
            p(-1.0, 0.0, 0.0),
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, -1.0, 0.0),
        ]
        .map(|q| store.add_vertex(q));
        let pairs = [(0, 1), (1, 2), (0, 3), (3, 1), (3, 2), (0, 4), (4, 1), (4, 2)];
        let e = pairs.map(|(a, b)| store.add_edge(v[a], v[b]).unwrap());
        let f = [
            [e[0], e[3], e[2]],
            [e[1], e[4], e[3]],
            [e[0], e[6], e[5]],
            [e[1], e[7], e[6]],
        ]
        .map(|edges| store.add_face(TriangleInput::Edges(edges)).unwrap());
        Fan { store, v, e, f }
    }

    #[test]
    fn unoriented_fan_is_rejected() {
        let Fan { mut store, v, f, .. } = fan();
        let s = store.add_surface();
        for face in f {
            store.surface_add(s, face).unwrap();
        }
        let err = FanOriented::new(s, v[1]).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TrisurfError::Topology(TopologyError::NotOriented)
        ));
    }

    #[test]
    fn oriented_fan_edges() {
        let Fan { mut store, v, e, f } = fan();
        let s = store.add_surface();
        for face in f {
            if !store.is_face_compatible(face, s).unwrap() {
                store.revert(face).unwrap();
            }
            store.surface_add(s, face).unwrap();
        }
        let edges = FanOriented::new(s, v[1]).execute(&store).unwrap();
        assert_eq!(edges.len(), 4);
        for expected in [e[2], e[4], e[5], e[7]] {
            assert!(edges.contains(&expected));
        }
        let edges = FanOriented::new(s, v[0]).execute(&store).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&e[3]));
        assert!(edges.contains(&e[6]));

        let boundary = Boundary::new(s).execute(&store).unwrap();
        assert_eq!(boundary.len(), 4);
    }

    #[test]
    fn closed_surface_has_no_boundary() {
        let mut store = TopologyStore::new();
        let tet = MakeTetrahedron::new().execute(&mut store).unwrap();
        assert!(Boundary::new(tet).execute(&store).unwrap().is_empty());
    }
}
