use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{OperationError, Result};

use super::segment::SegmentId;
use super::triangle::{TriangleId, TriangleKind};
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a surface in the topology store.
    pub struct SurfaceId;
}

/// Data associated with a surface: an ordered set of faces.
#[derive(Debug, Clone, Default)]
pub struct SurfaceData {
    /// Member faces in insertion order (up to removals).
    pub faces: Vec<TriangleId>,
    position: HashMap<TriangleId, usize>,
    pub(crate) handles: u32,
}

impl SurfaceData {
    pub(crate) fn new(handles: u32) -> Self {
        Self {
            handles,
            ..Self::default()
        }
    }

    /// Whether `f` belongs to the surface.
    #[must_use]
    pub fn contains(&self, f: TriangleId) -> bool {
        self.position.contains_key(&f)
    }

    fn insert(&mut self, f: TriangleId) -> bool {
        if self.contains(f) {
            return false;
        }
        self.position.insert(f, self.faces.len());
        self.faces.push(f);
        true
    }

    fn remove(&mut self, f: TriangleId) -> bool {
        let Some(i) = self.position.remove(&f) else {
            return false;
        };
        self.faces.swap_remove(i);
        if let Some(&moved) = self.faces.get(i) {
            self.position.insert(moved, i);
        }
        true
    }

    /// Number of external handles currently held on the surface.
    #[must_use]
    pub fn handles(&self) -> u32 {
        self.handles
    }
}

impl TopologyStore {
    /// Adds a face to a surface. Re-adding a member is a no-op.
    ///
    /// Returns `true` if the face was not already a member.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `f` is a plain triangle,
    /// or an error if either entity does not exist.
    pub fn surface_add(&mut self, s: SurfaceId, f: TriangleId) -> Result<bool> {
        if self.triangle(f)?.kind != TriangleKind::Face {
            return Err(OperationError::InvalidArgument(
                "only faces can be added to a surface".into(),
            )
            .into());
        }
        if !self.surface_mut(s)?.insert(f) {
            return Ok(false);
        }
        self.triangle_mut(f)?.surfaces.push(s);
        self.after_mutation("surface_add");
        Ok(true)
    }

    /// Adds every face of `src` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if either surface does not exist.
    pub fn surface_merge(&mut self, dst: SurfaceId, src: SurfaceId) -> Result<()> {
        let faces = self.surface(src)?.faces.clone();
        self.surface(dst)?;
        for f in faces {
            self.surface_add(dst, f)?;
        }
        Ok(())
    }

    /// Removes a face from a surface, destroying it if nothing else owns it.
    ///
    /// Returns `true` if the face was a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_remove(&mut self, s: SurfaceId, f: TriangleId) -> Result<bool> {
        if !self.surface_mut(s)?.remove(f) {
            return Ok(false);
        }
        let fd = self.triangle_mut(f)?;
        if let Some(pos) = fd.surfaces.iter().position(|&x| x == s) {
            fd.surfaces.swap_remove(pos);
        }
        self.collect_triangle(f);
        self.after_mutation("surface_remove");
        Ok(true)
    }

    /// Whether `f` belongs to `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_contains(&self, s: SurfaceId, f: TriangleId) -> Result<bool> {
        Ok(self.surface(s)?.contains(f))
    }

    /// Member faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_faces(&self, s: SurfaceId) -> Result<&[TriangleId]> {
        Ok(&self.surface(s)?.faces)
    }

    /// Number of member faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn face_count(&self, s: SurfaceId) -> Result<usize> {
        Ok(self.surface(s)?.faces.len())
    }

    /// Distinct edges of the member faces, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_edges(&self, s: SurfaceId) -> Result<Vec<SegmentId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &f in &self.surface(s)?.faces {
            for e in self.triangle(f)?.edges {
                if seen.insert(e) {
                    out.push(e);
                }
            }
        }
        Ok(out)
    }

    /// Number of distinct edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn edge_count(&self, s: SurfaceId) -> Result<usize> {
        Ok(self.surface_edges(s)?.len())
    }

    /// Distinct vertices of the member faces, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_vertices(&self, s: SurfaceId) -> Result<Vec<VertexId>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &f in &self.surface(s)?.faces {
            for v in self.triangle_vertices(f)? {
                if seen.insert(v) {
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Number of distinct vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn vertex_count_of(&self, s: SurfaceId) -> Result<usize> {
        Ok(self.surface_vertices(s)?.len())
    }

    /// Edges of the surface having an endpoint in `vertices`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn surface_edges_touching(&self, s: SurfaceId, vertices: &[VertexId]) -> Result<Vec<SegmentId>> {
        let wanted: HashSet<VertexId> = vertices.iter().copied().collect();
        let mut out = Vec::new();
        for e in self.surface_edges(s)? {
            let seg = self.segment(e)?;
            if wanted.contains(&seg.v1) || wanted.contains(&seg.v2) {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Faces of the surface bounded by any of `edges`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface or an edge does not exist.
    pub fn surface_faces_on(&self, s: SurfaceId, edges: &[SegmentId]) -> Result<Vec<TriangleId>> {
        let mut out = Vec::new();
        for t in self.triangles_of(edges)? {
            if self.surface_contains(s, t)? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Some face of the surface bounded by `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface or edge does not exist.
    pub fn surface_parent(&self, s: SurfaceId, edge: SegmentId) -> Result<Option<TriangleId>> {
        for &t in &self.segment(edge)?.triangles {
            if self.surface_contains(s, t)? {
                return Ok(Some(t));
            }
        }
        Ok(None)
    }

    /// The two faces of the surface bounded by `edge`, if there are exactly two.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface or edge does not exist.
    pub fn manifold_faces(
        &self,
        s: SurfaceId,
        edge: SegmentId,
    ) -> Result<Option<(TriangleId, TriangleId)>> {
        let faces = self.surface_faces_on(s, &[edge])?;
        Ok(match faces[..] {
            [a, b] => Some((a, b)),
            _ => None,
        })
    }

    fn edge_face_counts(&self, s: SurfaceId) -> Result<HashMap<SegmentId, usize>> {
        let mut counts = HashMap::new();
        for &f in &self.surface(s)?.faces {
            for e in self.triangle(f)?.edges {
                *counts.entry(e).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Every edge bounds at most two faces of the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn is_manifold(&self, s: SurfaceId) -> Result<bool> {
        Ok(self.edge_face_counts(s)?.values().all(|&n| n <= 2))
    }

    /// Every edge bounds exactly two faces of the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn is_closed(&self, s: SurfaceId) -> Result<bool> {
        Ok(self.edge_face_counts(s)?.values().all(|&n| n == 2))
    }

    /// Every pair of faces sharing an edge traverses it in opposite
    /// directions.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn is_orientable(&self, s: SurfaceId) -> Result<bool> {
        for e in self.surface_edges(s)? {
            let faces = self.surface_faces_on(s, &[e])?;
            for (i, &a) in faces.iter().enumerate() {
                for &b in &faces[i + 1..] {
                    if self.traversal(a, e)? == self.traversal(b, e)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Index triples of every face into `vertices`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if a face vertex is
    /// missing from `vertices`.
    pub fn face_indices(&self, s: SurfaceId, vertices: &[VertexId]) -> Result<Vec<[usize; 3]>> {
        let index: HashMap<VertexId, usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let lookup = |v: VertexId| -> Result<usize> {
            index.get(&v).copied().ok_or_else(|| {
                OperationError::InvalidArgument("face vertex missing from vertex list".into())
                    .into()
            })
        };
        self.surface(s)?
            .faces
            .iter()
            .map(|&f| {
                let [a, b, c] = self.triangle_vertices(f)?;
                Ok([lookup(a)?, lookup(b)?, lookup(c)?])
            })
            .collect()
    }

    /// Deep copy: a new surface whose faces, edges and vertices are all new
    /// entities with the same coordinates and orientation.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn copy_surface(&mut self, src: SurfaceId) -> Result<SurfaceId> {
        let faces = self.surface(src)?.faces.clone();
        let dst = self.add_surface();
        let mut vmap: HashMap<VertexId, VertexId> = HashMap::new();
        for f in faces {
            let old = self.triangle_vertices(f)?;
            let mut new = [VertexId::default(); 3];
            for (slot, v) in new.iter_mut().zip(old) {
                *slot = match vmap.get(&v) {
                    Some(&nv) => nv,
                    None => {
                        let nv = self.new_vertex(self.point(v)?);
                        vmap.insert(v, nv);
                        nv
                    }
                };
            }
            let nf = self.new_face(new)?;
            self.surface_add(dst, nf)?;
        }
        debug!(faces = self.face_count(dst)?, "surface copied");
        Ok(dst)
    }
}
