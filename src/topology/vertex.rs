use crate::error::Result;
use crate::math::Point3;

use super::segment::{SegmentId, SegmentKind};
use super::surface::SurfaceId;
use super::triangle::{TriangleId, TriangleKind};
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
}

/// Data associated with a topological vertex.
///
/// `segments` lists every segment and edge built on this vertex. It is a
/// traversal aid only and never keeps a segment alive.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The position of this vertex in 3D space.
    pub point: Point3,
    /// Incident segments and edges.
    pub segments: Vec<SegmentId>,
    pub(crate) handles: u32,
}

impl VertexData {
    pub(crate) fn new(point: Point3, handles: u32) -> Self {
        Self {
            point,
            segments: Vec::new(),
            handles,
        }
    }

    /// Number of external handles currently held on the vertex.
    #[must_use]
    pub fn handles(&self) -> u32 {
        self.handles
    }
}

impl TopologyStore {
    /// A vertex is unattached when no segment is built on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn is_unattached_vertex(&self, v: VertexId) -> Result<bool> {
        Ok(self.vertex(v)?.segments.is_empty())
    }

    /// Whether some segment or edge joins `v1` and `v2`.
    ///
    /// # Errors
    ///
    /// Returns an error if `v1` does not exist.
    pub fn is_connected(&self, v1: VertexId, v2: VertexId) -> Result<bool> {
        let vd = self.vertex(v1)?;
        for &s in &vd.segments {
            if self.segment(s)?.other(v1) == v2 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Vertices joined to `v` by a segment.
    ///
    /// With a surface, only edges bounding a face of that surface count.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` or the surface does not exist.
    pub fn vertex_neighbors(&self, v: VertexId, surface: Option<SurfaceId>) -> Result<Vec<VertexId>> {
        let mut out = Vec::new();
        for &s in &self.vertex(v)?.segments {
            let seg = self.segment(s)?;
            if let Some(surface) = surface {
                if seg.kind != SegmentKind::Edge || self.face_number(s, surface)? == 0 {
                    continue;
                }
            }
            let other = seg.other(v);
            if !out.contains(&other) {
                out.push(other);
            }
        }
        Ok(out)
    }

    /// Triangles and faces having `v` as a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` does not exist.
    pub fn vertex_triangles(&self, v: VertexId) -> Result<Vec<TriangleId>> {
        let mut out = Vec::new();
        for &s in &self.vertex(v)?.segments {
            for &t in &self.segment(s)?.triangles {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        Ok(out)
    }

    /// Faces having `v` as a vertex, optionally restricted to one surface.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` or the surface does not exist.
    pub fn vertex_faces(&self, v: VertexId, surface: Option<SurfaceId>) -> Result<Vec<TriangleId>> {
        let mut out = Vec::new();
        for t in self.vertex_triangles(v)? {
            if self.triangle(t)?.kind != TriangleKind::Face {
                continue;
            }
            if let Some(surface) = surface {
                if !self.surface_contains(surface, t)? {
                    continue;
                }
            }
            out.push(t);
        }
        Ok(out)
    }

    /// Number of groups of triangles around `v` that are connected
    /// through edges incident to `v`.
    ///
    /// An interior vertex of a manifold has one contact; a vertex where two
    /// cones touch tip to tip has two; an isolated vertex has none.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` does not exist.
    pub fn vertex_contacts(&self, v: VertexId) -> Result<usize> {
        let triangles = self.vertex_triangles(v)?;
        let mut group: Vec<Option<usize>> = vec![None; triangles.len()];
        let mut groups = 0;
        for start in 0..triangles.len() {
            if group[start].is_some() {
                continue;
            }
            group[start] = Some(groups);
            let mut stack = vec![start];
            while let Some(i) = stack.pop() {
                for e in self.triangle(triangles[i])?.edges {
                    let seg = self.segment(e)?;
                    if seg.v1 != v && seg.v2 != v {
                        continue;
                    }
                    for t in &seg.triangles {
                        if let Some(j) = triangles.iter().position(|x| x == t) {
                            if group[j].is_none() {
                                group[j] = Some(groups);
                                stack.push(j);
                            }
                        }
                    }
                }
            }
            groups += 1;
        }
        Ok(groups)
    }

    /// Whether `v` lies on an edge bounding exactly one face of `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` or the surface does not exist.
    pub fn is_boundary_vertex(&self, v: VertexId, surface: SurfaceId) -> Result<bool> {
        for &s in &self.vertex(v)?.segments {
            if self.segment(s)?.kind == SegmentKind::Edge && self.face_number(s, surface)? == 1 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether `v` lies strictly inside the diametral circle of `edge`,
    /// measured in the xy-plane.
    ///
    /// # Errors
    ///
    /// Returns an error if `v` or `edge` does not exist.
    pub fn encroaches(&self, v: VertexId, edge: SegmentId) -> Result<bool> {
        let p = self.point(v)?;
        let [a, b] = self.segment_points(edge)?;
        let dot = (a.x - p.x) * (b.x - p.x) + (a.y - p.y) * (b.y - p.y);
        Ok(dot < 0.0)
    }
}
