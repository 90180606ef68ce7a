use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::topology::{SegmentId, SegmentKind, SurfaceId, TopologyStore, VertexId};

/// Refines a surface by splitting every face into four.
///
/// A new vertex is placed at the midpoint of each edge, shared by the faces
/// on both sides, and every face `(a, b, c)` is replaced by the corner
/// faces and the central face, all keeping its orientation.
pub struct Tessellate {
    surface: SurfaceId,
}

impl Tessellate {
    /// Creates a new `Tessellate` operation.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the refinement in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let s = self.surface;
        let faces = store.surface_faces(s)?.to_vec();
        let mut midpoints: HashMap<SegmentId, VertexId> = HashMap::new();
        for e in store.surface_edges(s)? {
            let [a, b] = store.segment_points(e)?;
            midpoints.insert(e, store.new_vertex(nalgebra::center(&a, &b)));
        }

        for &f in &faces {
            let [a, b, c] = store.triangle_vertices(f)?;
            let mid = |store: &TopologyStore, u: VertexId, v: VertexId| -> Result<VertexId> {
                store
                    .find_segment(SegmentKind::Edge, u, v)
                    .and_then(|e| midpoints.get(&e).copied())
                    .ok_or_else(|| TopologyError::InvalidTopology("face edge outside the surface".into()).into())
            };
            let ab = mid(store, a, b)?;
            let bc = mid(store, b, c)?;
            let ca = mid(store, c, a)?;
            for tri in [[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]] {
                let nf = store.new_face(tri)?;
                store.surface_add(s, nf)?;
            }
        }
        for f in faces {
            store.surface_remove(s, f)?;
        }
        debug!(faces = store.face_count(s)?, "surface tessellated");
        Ok(())
    }
}
