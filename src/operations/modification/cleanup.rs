use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore, VertexId};

use super::MergeVertices;

/// Parameters for [`Cleanup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanupParams {
    /// Vertices closer than this are merged; `0` skips vertex merging.
    pub epsilon: f64,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self { epsilon: 0.0 }
    }
}

impl CleanupParams {
    /// Sets the vertex merging distance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

/// Repairs a surface in place.
///
/// Merges vertices of the surface closer than `epsilon` (each group
/// collapses onto its last member), then rebuilds every face touching a
/// merged vertex on the surviving vertices. Faces that collapse to an edge
/// or a point are dropped, and faces that become duplicates of one another
/// are unified. Faces not touching a merged vertex keep their identity.
pub struct Cleanup {
    surface: SurfaceId,
    params: CleanupParams,
}

impl Cleanup {
    /// Creates a new `Cleanup` operation.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            params: CleanupParams::default(),
        }
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_params(mut self, params: CleanupParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the cleanup.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist or `epsilon` is
    /// negative.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let s = self.surface;
        let vertices = store.surface_vertices(s)?;
        let map = if self.params.epsilon == 0.0 {
            HashMap::new()
        } else {
            MergeVertices::new(vertices, self.params.epsilon).representatives(store)?
        };
        let merged = map.iter().filter(|(v, r)| v != r).count();
        let target = |v: VertexId| map.get(&v).copied().unwrap_or(v);

        let mut dropped = 0usize;
        let mut rebuilt = 0usize;
        for f in store.surface_faces(s)?.to_vec() {
            let old = store.triangle_vertices(f)?;
            let new = old.map(target);
            if new == old {
                continue;
            }
            if new[0] != new[1] && new[1] != new[2] && new[2] != new[0] {
                let nf = store.new_face(new)?;
                store.surface_add(s, nf)?;
                rebuilt += 1;
            } else {
                dropped += 1;
            }
            store.surface_remove(s, f)?;
        }
        debug!(merged, rebuilt, dropped, "surface cleaned up");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::topology::TriangleInput;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn near_vertices_are_welded() {
        let mut store = TopologyStore::new().with_checks(true);
        let v1 = store.add_vertex(p(-1.0, 0.0, 0.0));
        let v2a = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2b = store.add_vertex(p(1e-10, 0.0, 0.0));
        let v3 = store.add_vertex(p(0.0, 1.0, 0.0));
        let v4 = store.add_vertex(p(1.0, 0.0, 0.0));
        let f1 = store.add_face(TriangleInput::Vertices([v1, v2a, v3])).unwrap();
        let f2 = store.add_face(TriangleInput::Vertices([v2b, v3, v4])).unwrap();
        let s = store.add_surface();
        store.surface_add(s, f1).unwrap();
        store.surface_add(s, f2).unwrap();
        assert_eq!(store.common_edge(f1, f2).unwrap(), None);
        assert_eq!(store.vertex_count_of(s).unwrap(), 5);

        Cleanup::new(s)
            .with_params(CleanupParams::default().with_epsilon(1e-6))
            .execute(&mut store)
            .unwrap();

        assert_eq!(store.face_count(s).unwrap(), 2);
        assert_eq!(store.vertex_count_of(s).unwrap(), 4);
        let faces = store.surface_faces(s).unwrap().to_vec();
        assert!(store.common_edge(faces[0], faces[1]).unwrap().is_some());
        // Handles keep the merged-away vertex alive.
        assert!(store.contains_vertex(v2a) && store.contains_vertex(v2b));
        assert!(store.is_ok());
    }

    #[test]
    fn collapsed_faces_are_dropped() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(0.0, 0.0, 0.0));
        let b = store.add_vertex(p(1e-9, 0.0, 0.0));
        let c = store.add_vertex(p(0.0, 1.0, 0.0));
        let d = store.add_vertex(p(1.0, 1.0, 0.0));
        let s = store.add_surface();
        for tri in [[a, b, c], [b, d, c]] {
            let f = store.add_face(TriangleInput::Vertices(tri)).unwrap();
            store.surface_add(s, f).unwrap();
            store.release_triangle(f).unwrap();
        }
        Cleanup::new(s)
            .with_params(CleanupParams::default().with_epsilon(1e-6))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face_count(s).unwrap(), 1);
        assert!(store.is_ok());
    }
}
