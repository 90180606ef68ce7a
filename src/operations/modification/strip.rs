use std::collections::HashSet;

use crate::error::Result;
use crate::topology::{SegmentId, SurfaceId, TopologyStore, TriangleId, VertexId};

/// Decomposes a surface into triangle strips.
///
/// Consecutive faces of a strip share an edge, and no three consecutive
/// shared edges meet at a common vertex, so each strip can be drawn as a
/// single sequence of vertices. Strips are grown greedily, always moving to
/// the candidate face with the fewest free neighbors.
pub struct Strip {
    surface: SurfaceId,
}

impl Strip {
    /// Creates a new `Strip` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query, returning the strips as ordered face lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<Vec<TriangleId>>> {
        let s = self.surface;
        let faces = store.surface_faces(s)?;
        let mut used: HashSet<TriangleId> = HashSet::with_capacity(faces.len());
        let free_neighbors = |used: &HashSet<TriangleId>, f: TriangleId| -> Result<usize> {
            Ok(store
                .face_neighbors(f, s)?
                .into_iter()
                .filter(|n| !used.contains(n))
                .count())
        };

        let mut strips = Vec::new();
        loop {
            let mut start: Option<(usize, TriangleId)> = None;
            for &f in faces {
                if used.contains(&f) {
                    continue;
                }
                let n = free_neighbors(&used, f)?;
                if start.is_none_or(|(best, _)| n < best) {
                    start = Some((n, f));
                }
            }
            let Some((_, first)) = start else {
                break;
            };

            used.insert(first);
            let mut strip = vec![first];
            let mut current = first;
            let mut entry: Option<SegmentId> = None;
            let mut pivot: Option<VertexId> = None;
            loop {
                let mut next: Option<(usize, TriangleId, SegmentId)> = None;
                for e in store.triangle(current)?.edges {
                    if Some(e) == entry {
                        continue;
                    }
                    if let Some(pv) = pivot {
                        if store.segment(e)?.has_vertex(pv) {
                            continue;
                        }
                    }
                    for &t in &store.segment(e)?.triangles {
                        if t == current || used.contains(&t) || !store.surface_contains(s, t)? {
                            continue;
                        }
                        let n = free_neighbors(&used, t)?;
                        if next.is_none_or(|(best, _, _)| n < best) {
                            next = Some((n, t, e));
                        }
                    }
                }
                let Some((_, t, e)) = next else {
                    break;
                };
                pivot = match entry {
                    Some(prev) => shared_vertex(store, prev, e)?,
                    None => None,
                };
                entry = Some(e);
                used.insert(t);
                strip.push(t);
                current = t;
            }
            strips.push(strip);
        }
        Ok(strips)
    }
}

fn shared_vertex(store: &TopologyStore, a: SegmentId, b: SegmentId) -> Result<Option<VertexId>> {
    let (sa, sb) = (store.segment(a)?, store.segment(b)?);
    Ok([sa.v1, sa.v2].into_iter().find(|&v| sb.has_vertex(v)))
}
