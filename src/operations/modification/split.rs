use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore, TriangleId};

/// Splits a surface into its edge-connected components.
///
/// Each component becomes a new surface (held by one handle) sharing the
/// original faces; the source surface is left unchanged. Components are
/// ordered by their first face in the source.
pub struct Split {
    surface: SurfaceId,
}

impl Split {
    /// Creates a new `Split` operation.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the split, returning one surface per component.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<SurfaceId>> {
        let components = self.components(store)?;
        let mut out = Vec::with_capacity(components.len());
        for faces in components {
            let part = store.add_surface();
            for f in faces {
                store.surface_add(part, f)?;
            }
            out.push(part);
        }
        debug!(parts = out.len(), "surface split");
        Ok(out)
    }

    fn components(&self, store: &TopologyStore) -> Result<Vec<Vec<TriangleId>>> {
        let s = self.surface;
        let mut seen: HashSet<TriangleId> = HashSet::new();
        let mut components = Vec::new();
        for &start in store.surface_faces(s)? {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut stack = vec![start];
            while let Some(f) = stack.pop() {
                for n in store.face_neighbors(f, s)? {
                    if seen.insert(n) {
                        component.push(n);
                        stack.push(n);
                    }
                }
            }
            components.push(component);
        }
        Ok(components)
    }
}
