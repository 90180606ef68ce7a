use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore, VertexId};

use super::face_intersection::PointTable;

/// Builds a new surface, held by one handle, from the kept triangles.
///
/// Every vertex and face of the result is a fresh entity, so the operands
/// are left untouched. On error nothing created here survives.
pub fn assemble_result(store: &mut TopologyStore, table: &PointTable, kept: &[[usize; 3]]) -> Result<SurfaceId> {
    let surface = store.add_surface();
    let mut vertices: HashMap<usize, VertexId> = HashMap::new();
    match add_faces(store, surface, table, kept, &mut vertices) {
        Ok(duplicates) => {
            if duplicates > 0 {
                debug!(duplicates, "coincident result faces merged");
            }
            Ok(surface)
        }
        Err(e) => {
            store.release_surface(surface)?;
            for v in vertices.into_values() {
                store.collect_vertex(v);
            }
            Err(e)
        }
    }
}

fn add_faces(
    store: &mut TopologyStore,
    surface: SurfaceId,
    table: &PointTable,
    kept: &[[usize; 3]],
    vertices: &mut HashMap<usize, VertexId>,
) -> Result<usize> {
    let mut duplicates = 0;
    for tri in kept {
        let ids = tri.map(|i| *vertices.entry(i).or_insert_with(|| store.new_vertex(*table.point(i))));
        let face = store.new_face(ids)?;
        if !store.surface_add(surface, face)? {
            duplicates += 1;
        }
    }
    Ok(duplicates)
}
