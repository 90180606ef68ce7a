use crate::error::Result;
use crate::math::intersect_3d::{segment_triangle, segments_intersect_2d, SegmentTriangleHit};
use crate::math::Point3;

use super::surface::SurfaceId;
use super::triangle::TriangleId;
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a segment or edge in the topology store.
    pub struct SegmentId;
}

/// Distinguishes plain segments from edges, which may bound triangles.
///
/// The two kinds are deduplicated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentKind {
    /// A bare vertex pair.
    Segment,
    /// A vertex pair that can bound triangles.
    Edge,
}

/// Data associated with a segment.
#[derive(Debug, Clone)]
pub struct SegmentData {
    /// Segment or edge.
    pub kind: SegmentKind,
    /// First endpoint.
    pub v1: VertexId,
    /// Second endpoint.
    pub v2: VertexId,
    /// Triangles bounded by this edge. Always empty for plain segments.
    pub triangles: Vec<TriangleId>,
    pub(crate) handles: u32,
}

impl SegmentData {
    pub(crate) fn new(kind: SegmentKind, v1: VertexId, v2: VertexId, handles: u32) -> Self {
        Self {
            kind,
            v1,
            v2,
            triangles: Vec::new(),
            handles,
        }
    }

    /// The endpoint that is not `v`.
    #[must_use]
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.v1 == v {
            self.v2
        } else {
            self.v1
        }
    }

    /// Whether the segment joins `a` and `b`, in either direction.
    #[must_use]
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.v1 == a && self.v2 == b) || (self.v1 == b && self.v2 == a)
    }

    /// Whether `v` is an endpoint.
    #[must_use]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// Number of external handles currently held on the segment.
    #[must_use]
    pub fn handles(&self) -> u32 {
        self.handles
    }
}

impl TopologyStore {
    /// A segment is unattached when no triangle uses it.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not exist.
    pub fn is_unattached_segment(&self, s: SegmentId) -> Result<bool> {
        Ok(self.segment(s)?.triangles.is_empty())
    }

    /// Endpoint positions in `(v1, v2)` order.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or an endpoint does not exist.
    pub fn segment_points(&self, s: SegmentId) -> Result<[Point3; 2]> {
        let seg = self.segment(s)?;
        Ok([self.point(seg.v1)?, self.point(seg.v2)?])
    }

    /// Euclidean length.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not exist.
    pub fn segment_length(&self, s: SegmentId) -> Result<f64> {
        let [a, b] = self.segment_points(s)?;
        Ok((b - a).norm())
    }

    /// Whether two segments share an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment does not exist.
    pub fn segments_touch(&self, s1: SegmentId, s2: SegmentId) -> Result<bool> {
        let a = self.segment(s1)?;
        let b = self.segment(s2)?;
        Ok(b.has_vertex(a.v1) || b.has_vertex(a.v2))
    }

    /// Whether two segments have the same endpoint coordinates, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment does not exist.
    pub fn segments_equal(&self, s1: SegmentId, s2: SegmentId) -> Result<bool> {
        let [a1, a2] = self.segment_points(s1)?;
        let [b1, b2] = self.segment_points(s2)?;
        Ok((a1 == b1 && a2 == b2) || (a1 == b2 && a2 == b1))
    }

    /// Classifies two segments projected on the xy-plane: `1` for a proper
    /// crossing, `0` if they touch, `-1` if they are disjoint.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment does not exist.
    pub fn segments_intersect(&self, s1: SegmentId, s2: SegmentId) -> Result<i32> {
        let [a, b] = self.segment_points(s1)?;
        let [c, d] = self.segment_points(s2)?;
        Ok(segments_intersect_2d(&a, &b, &c, &d))
    }

    /// Creates a new vertex at the midpoint, held by one external handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not exist.
    pub fn midvertex(&mut self, s: SegmentId) -> Result<VertexId> {
        let [a, b] = self.segment_points(s)?;
        Ok(self.add_vertex(nalgebra::center(&a, &b)))
    }

    /// Vertex where the segment pierces the triangle.
    ///
    /// When the segment passes through a vertex of the triangle, that vertex
    /// is returned. Otherwise a new vertex is created at the crossing point.
    /// Crossings through an edge of the triangle count only if `boundary`
    /// is set. A segment lying in the plane of the triangle never
    /// intersects it. The returned vertex gains one external handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or triangle does not exist.
    pub fn segment_intersection(
        &mut self,
        s: SegmentId,
        t: TriangleId,
        boundary: bool,
    ) -> Result<Option<VertexId>> {
        let [p, q] = self.segment_points(s)?;
        let tv = self.triangle_vertices(t)?;
        let [a, b, c] = self.triangle_points(t)?;
        let point = match segment_triangle(&p, &q, &a, &b, &c) {
            SegmentTriangleHit::Miss | SegmentTriangleHit::Coplanar => return Ok(None),
            SegmentTriangleHit::Vertex(i) => {
                self.retain_vertex(tv[i])?;
                return Ok(Some(tv[i]));
            }
            SegmentTriangleHit::Edge(_, point) if boundary => point,
            SegmentTriangleHit::Edge(..) => return Ok(None),
            SegmentTriangleHit::Interior(point) => point,
        };
        Ok(Some(self.add_vertex(point)))
    }

    /// Number of faces of `surface` bounded by `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or surface does not exist.
    pub fn face_number(&self, edge: SegmentId, surface: SurfaceId) -> Result<usize> {
        let mut n = 0;
        for &t in &self.segment(edge)?.triangles {
            if self.surface_contains(surface, t)? {
                n += 1;
            }
        }
        Ok(n)
    }

    /// The single face of `surface` bounded by `edge`, if there is exactly one.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or surface does not exist.
    pub fn boundary_face(&self, edge: SegmentId, surface: SurfaceId) -> Result<Option<TriangleId>> {
        let mut found = None;
        for &t in &self.segment(edge)?.triangles {
            if self.surface_contains(surface, t)? {
                if found.is_some() {
                    return Ok(None);
                }
                found = Some(t);
            }
        }
        Ok(found)
    }

    /// Whether `edge` bounds exactly one face of `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or surface does not exist.
    pub fn is_boundary_edge(&self, edge: SegmentId, surface: SurfaceId) -> Result<bool> {
        Ok(self.boundary_face(edge, surface)?.is_some())
    }

    /// Whether `edge` is part of a tetrahedron made of four stored triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    pub fn belongs_to_tetrahedron(&self, edge: SegmentId) -> Result<bool> {
        let seg = self.segment(edge)?;
        let (a, b) = (seg.v1, seg.v2);
        let apexes = seg
            .triangles
            .iter()
            .map(|&t| self.opposite_vertex(t, edge))
            .collect::<Result<Vec<_>>>()?;
        for (i, &c) in apexes.iter().enumerate() {
            for &d in &apexes[i + 1..] {
                if c == d {
                    continue;
                }
                let Some(cd) = self.find_segment(SegmentKind::Edge, c, d) else {
                    continue;
                };
                let cd_triangles = &self.segment(cd)?.triangles;
                let mut has_a = false;
                let mut has_b = false;
                for &t in cd_triangles {
                    let apex = self.opposite_vertex(t, cd)?;
                    has_a |= apex == a;
                    has_b |= apex == b;
                }
                if has_a && has_b {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::TriangleInput;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn intersection_with_triangle() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(1.0, 0.0, 1.0));
        let b = store.add_vertex(p(-1.0, 1.0, 1.0));
        let c = store.add_vertex(p(-1.0, -1.0, 1.0));
        let t = store.add_triangle(TriangleInput::Vertices([a, b, c])).unwrap();

        let p1 = store.add_vertex(p(0.0, 0.0, 2.0));
        let p2 = store.add_vertex(p(0.0, 0.0, 0.0));
        let s = store.add_segment(p1, p2).unwrap();
        let hit = store.segment_intersection(s, t, true).unwrap().unwrap();
        assert_relative_eq!(store.point(hit).unwrap(), p(0.0, 0.0, 1.0));

        // Through a summit: the triangle's own vertex comes back.
        let q1 = store.add_vertex(p(1.0, 0.0, 2.0));
        let q2 = store.add_vertex(p(1.0, 0.0, 0.0));
        let s = store.add_segment(q1, q2).unwrap();
        assert_eq!(store.segment_intersection(s, t, true).unwrap(), Some(a));

        // Through an edge.
        let r1 = store.add_vertex(p(-1.0, 0.0, 2.0));
        let r2 = store.add_vertex(p(-1.0, 0.0, 0.0));
        let s = store.add_segment(r1, r2).unwrap();
        assert!(store.segment_intersection(s, t, true).unwrap().is_some());
        assert!(store.segment_intersection(s, t, false).unwrap().is_none());

        // Coplanar.
        let c1 = store.add_vertex(p(1.0, 0.0, 1.0));
        let c2 = store.add_vertex(p(-1.0, 0.0, 1.0));
        let s = store.add_segment(c1, c2).unwrap();
        assert!(store.segment_intersection(s, t, true).unwrap().is_none());
    }

    #[test]
    fn xy_classification_and_equality() {
        let mut store = TopologyStore::new();
        let v = [
            p(0.0, -1.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(-1.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(0.0, 1.0, 0.0),
            p(0.0, -1.0, 0.0),
        ]
        .map(|q| store.add_vertex(q));
        let s1 = store.add_segment(v[0], v[1]).unwrap();
        let s2 = store.add_segment(v[2], v[3]).unwrap();
        let s3 = store.add_segment(v[4], v[5]).unwrap();
        assert_eq!(store.segments_intersect(s1, s2).unwrap(), 1);
        assert!(store.segments_equal(s1, s3).unwrap());
        assert!(!store.segments_equal(s1, s2).unwrap());
        assert!(!store.segments_touch(s1, s3).unwrap());
    }

    #[test]
    fn midvertex_lies_halfway() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(0.0, 0.0, 0.0));
        let b = store.add_vertex(p(1.0, 1.0, 1.0));
        let s = store.add_segment(a, b).unwrap();
        let m = store.midvertex(s).unwrap();
        assert_relative_eq!(store.point(m).unwrap(), p(0.5, 0.5, 0.5));
        assert_relative_eq!(store.segment_length(s).unwrap(), 3.0_f64.sqrt());
    }

    #[test]
    fn tetrahedron_membership() {
        let mut store = TopologyStore::new();
        let v = [
            p(1.0, 1.0, 1.0),
            p(-1.0, -1.0, 1.0),
            p(-1.0, 1.0, -1.0),
            p(1.0, -1.0, -1.0),
        ]
        .map(|q| store.add_vertex(q));
        store.add_face(TriangleInput::Vertices([v[0], v[1], v[2]])).unwrap();
        store.add_face(TriangleInput::Vertices([v[0], v[3], v[1]])).unwrap();
        store.add_face(TriangleInput::Vertices([v[1], v[3], v[2]])).unwrap();
        let e = store.find_segment(SegmentKind::Edge, v[0], v[1]).unwrap();
        assert!(!store.belongs_to_tetrahedron(e).unwrap());
        store.add_face(TriangleInput::Vertices([v[0], v[2], v[3]])).unwrap();
        assert!(store.belongs_to_tetrahedron(e).unwrap());
    }
}
