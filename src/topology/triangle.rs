use std::f64::consts::PI;

use crate::error::{GeometryError, OperationError, Result};
use crate::math::predicates::{orient2d, orient3d, sign};
use crate::math::{Point3, Vector3};

use super::segment::SegmentId;
use super::surface::SurfaceId;
use super::vertex::VertexId;
use super::TopologyStore;

slotmap::new_key_type! {
    /// Unique identifier for a triangle or face in the topology store.
    pub struct TriangleId;
}

/// Distinguishes free triangles from faces, which may join surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriangleKind {
    /// A triangle that cannot be part of a surface.
    Triangle,
    /// A triangle that surfaces may own.
    Face,
}

/// Arguments accepted when building a triangle.
///
/// Mixing edges and vertices is not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleInput {
    /// Three edges joined in a cycle, in any order.
    Edges([SegmentId; 3]),
    /// Three distinct vertices; missing edges are created.
    Vertices([VertexId; 3]),
}

/// Result of [`TopologyStore::is_stabbed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stab {
    /// The ray crosses the interior.
    Triangle(TriangleId),
    /// The ray crosses an edge.
    Edge(SegmentId),
    /// The ray passes through a vertex.
    Vertex(VertexId),
}

/// Data associated with a triangle.
///
/// The orientation is the cyclic order `v1, v2, v3` where `v2` is the
/// vertex shared by `edges[0]` and `edges[1]`.
#[derive(Debug, Clone)]
pub struct TriangleData {
    /// Triangle or face.
    pub kind: TriangleKind,
    /// The bounding edges.
    pub edges: [SegmentId; 3],
    /// Surfaces owning this face, one entry per membership.
    pub surfaces: Vec<SurfaceId>,
    pub(crate) handles: u32,
}

impl TriangleData {
    pub(crate) fn new(kind: TriangleKind, edges: [SegmentId; 3], handles: u32) -> Self {
        Self {
            kind,
            edges,
            surfaces: Vec::new(),
            handles,
        }
    }

    /// Number of external handles currently held on the triangle.
    #[must_use]
    pub fn handles(&self) -> u32 {
        self.handles
    }
}

impl TopologyStore {
    /// A face is unattached when no surface owns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn is_unattached_triangle(&self, t: TriangleId) -> Result<bool> {
        Ok(self.triangle(t)?.surfaces.is_empty())
    }

    /// Vertices in orientation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle or one of its edges does not exist.
    pub fn triangle_vertices(&self, t: TriangleId) -> Result<[VertexId; 3]> {
        let tri = self.triangle(t)?;
        let s1 = self.segment(tri.edges[0])?;
        let s2 = self.segment(tri.edges[1])?;
        let (v1, v2) = if s2.has_vertex(s1.v1) {
            (s1.v2, s1.v1)
        } else {
            (s1.v1, s1.v2)
        };
        Ok([v1, v2, s2.other(v2)])
    }

    /// Vertex positions in orientation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_points(&self, t: TriangleId) -> Result<[Point3; 3]> {
        let [a, b, c] = self.triangle_vertices(t)?;
        Ok([self.point(a)?, self.point(b)?, self.point(c)?])
    }

    /// The vertex opposite the first edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_vertex(&self, t: TriangleId) -> Result<VertexId> {
        Ok(self.triangle_vertices(t)?[2])
    }

    /// Flips the orientation.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn revert(&mut self, t: TriangleId) -> Result<()> {
        let tri = self.triangle_mut(t)?;
        tri.edges.swap(1, 2);
        self.after_mutation("revert");
        Ok(())
    }

    /// Ordered endpoints of `edge` as traversed by the triangle.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `edge` does not bound `t`.
    pub fn traversal(&self, t: TriangleId, edge: SegmentId) -> Result<(VertexId, VertexId)> {
        let [a, b, c] = self.triangle_vertices(t)?;
        let seg = self.segment(edge)?;
        [(a, b), (b, c), (c, a)]
            .into_iter()
            .find(|&(x, y)| seg.connects(x, y))
            .ok_or_else(|| {
                OperationError::InvalidArgument("edge does not bound the triangle".into()).into()
            })
    }

    /// Unnormalized normal `(v2 - v1) x (v3 - v1)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_normal(&self, t: TriangleId) -> Result<Vector3> {
        let [a, b, c] = self.triangle_points(t)?;
        Ok((b - a).cross(&(c - a)))
    }

    /// Area of the triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_area(&self, t: TriangleId) -> Result<f64> {
        Ok(self.triangle_normal(t)?.norm() / 2.0)
    }

    /// Sum of the edge lengths.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_perimeter(&self, t: TriangleId) -> Result<f64> {
        let [a, b, c] = self.triangle_points(t)?;
        Ok((b - a).norm() + (c - b).norm() + (a - c).norm())
    }

    /// `sqrt(area) / perimeter`, scaled so an equilateral triangle scores 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_quality(&self, t: TriangleId) -> Result<f64> {
        let perimeter = self.triangle_perimeter(t)?;
        if perimeter == 0.0 {
            return Ok(0.0);
        }
        let k = 6.0 / 3.0_f64.sqrt().sqrt();
        Ok(self.triangle_area(t)?.sqrt() * k / perimeter)
    }

    /// Twice the signed area of the xy-projection; positive when the
    /// triangle is counter-clockwise seen from `+z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn triangle_orientation(&self, t: TriangleId) -> Result<f64> {
        let [a, b, c] = self.triangle_points(t)?;
        Ok(orient2d(&a, &b, &c))
    }

    /// Angle in `[-pi, 0]` between the normals of two triangles, shifted by
    /// `pi`: coplanar triangles facing the same way give `-pi`.
    ///
    /// # Errors
    ///
    /// Returns an error if either triangle does not exist.
    pub fn triangles_angle(&self, t1: TriangleId, t2: TriangleId) -> Result<f64> {
        let n1 = self.triangle_normal(t1)?;
        let n2 = self.triangle_normal(t2)?;
        let mut theta = n1.cross(&n2).norm().atan2(n1.dot(&n2)) - PI;
        if theta < -PI {
            theta += 2.0 * PI;
        }
        if theta > PI {
            theta -= 2.0 * PI;
        }
        Ok(theta)
    }

    /// First edge shared by two triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if either triangle does not exist.
    pub fn common_edge(&self, t1: TriangleId, t2: TriangleId) -> Result<Option<SegmentId>> {
        let a = self.triangle(t1)?.edges;
        let b = self.triangle(t2)?.edges;
        Ok(a.into_iter().find(|e| b.contains(e)))
    }

    /// Whether two triangles traverse their common edge in opposite
    /// directions.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if they share no edge.
    pub fn triangles_compatible(&self, t1: TriangleId, t2: TriangleId) -> Result<bool> {
        let edge = self.common_edge(t1, t2)?.ok_or_else(|| {
            OperationError::InvalidArgument("triangles share no edge".into())
        })?;
        let (a1, b1) = self.traversal(t1, edge)?;
        let (a2, b2) = self.traversal(t2, edge)?;
        Ok(a1 == b2 && b1 == a2)
    }

    /// Vertex of `t` not on `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `edge` does not bound `t`.
    pub fn opposite_vertex(&self, t: TriangleId, edge: SegmentId) -> Result<VertexId> {
        if !self.triangle(t)?.edges.contains(&edge) {
            return Err(
                OperationError::InvalidArgument("edge does not bound the triangle".into()).into(),
            );
        }
        let seg = self.segment(edge)?;
        self.triangle_vertices(t)?
            .into_iter()
            .find(|&v| !seg.has_vertex(v))
            .ok_or_else(|| OperationError::Failed("triangle has no opposite vertex".into()).into())
    }

    /// Edge of `t` not touching `v`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `v` is not a vertex of `t`.
    pub fn opposite_edge(&self, t: TriangleId, v: VertexId) -> Result<SegmentId> {
        if !self.triangle_vertices(t)?.contains(&v) {
            return Err(
                OperationError::InvalidArgument("vertex is not on the triangle".into()).into(),
            );
        }
        for e in self.triangle(t)?.edges {
            if !self.segment(e)?.has_vertex(v) {
                return Ok(e);
            }
        }
        Err(OperationError::Failed("triangle has no opposite edge".into()).into())
    }

    /// Whether two triangles have the same vertex coordinates, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if either triangle does not exist.
    pub fn triangles_equal(&self, t1: TriangleId, t2: TriangleId) -> Result<bool> {
        let a = self.triangle_points(t1)?;
        let mut b = self.triangle_points(t2)?.to_vec();
        for p in a {
            match b.iter().position(|q| *q == p) {
                Some(i) => {
                    b.swap_remove(i);
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Center of the circle through the three vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a collinear triangle.
    pub fn circumcenter(&self, t: TriangleId) -> Result<Point3> {
        let [a, b, c] = self.triangle_points(t)?;
        let u = a - c;
        let v = b - c;
        let n = u.cross(&v);
        let n2 = n.norm_squared();
        if n2 == 0.0 {
            return Err(GeometryError::Degenerate("collinear triangle has no circumcenter".into()).into());
        }
        let offset = (v * u.norm_squared() - u * v.norm_squared()).cross(&n) / (2.0 * n2);
        Ok(c + offset)
    }

    /// Casts a ray from `p` toward `+z` and reports what it hits.
    ///
    /// Returns `None` when `p` is not strictly below the triangle, when the
    /// ray misses, or when the triangle is vertical.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn is_stabbed(&self, t: TriangleId, p: &Point3) -> Result<Option<Stab>> {
        let vs = self.triangle_vertices(t)?;
        let [a, b, c] = self.triangle_points(t)?;
        let o = sign(orient2d(&a, &b, &c));
        if o == 0 {
            return Ok(None);
        }
        let s = [
            sign(orient2d(&a, &b, p)) * o,
            sign(orient2d(&b, &c, p)) * o,
            sign(orient2d(&c, &a, p)) * o,
        ];
        if s.contains(&-1) {
            return Ok(None);
        }
        if sign(orient3d(&a, &b, &c, p)) * o <= 0 {
            return Ok(None);
        }
        let edges = self.triangle(t)?.edges;
        let edge_of = |x: VertexId, y: VertexId| -> Result<SegmentId> {
            for e in edges {
                if self.segment(e)?.connects(x, y) {
                    return Ok(e);
                }
            }
            Err(OperationError::Failed("triangle edge not found".into()).into())
        };
        let stab = match (s[0] == 0, s[1] == 0, s[2] == 0) {
            (false, false, false) => Stab::Triangle(t),
            (true, false, false) => Stab::Edge(edge_of(vs[0], vs[1])?),
            (false, true, false) => Stab::Edge(edge_of(vs[1], vs[2])?),
            (false, false, true) => Stab::Edge(edge_of(vs[2], vs[0])?),
            (true, false, true) => Stab::Vertex(vs[0]),
            (true, true, false) => Stab::Vertex(vs[1]),
            (false, true, true) => Stab::Vertex(vs[2]),
            (true, true, true) => return Ok(None),
        };
        Ok(Some(stab))
    }

    /// Height of the triangle's plane above `(p.x, p.y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a vertical triangle.
    pub fn interpolate_height(&self, t: TriangleId, p: &Point3) -> Result<f64> {
        let [a, _, _] = self.triangle_points(t)?;
        let n = self.triangle_normal(t)?;
        if n.z == 0.0 {
            return Err(GeometryError::Degenerate("vertical triangle".into()).into());
        }
        Ok(a.z - (n.x * (p.x - a.x) + n.y * (p.y - a.y)) / n.z)
    }

    /// Classifies `p` against the xy-projection of the triangle: positive
    /// inside, `0` on an edge, negative outside.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn point_in_triangle(&self, p: &Point3, t: TriangleId) -> Result<i32> {
        let [a, b, c] = self.triangle_points(t)?;
        Ok(crate::math::predicates::in_triangle_2d(p, &a, &b, &c))
    }

    // --- Faces and surfaces ---

    /// Faces of `surface` sharing an edge with `f`, once per shared edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or surface does not exist.
    pub fn face_neighbors(&self, f: TriangleId, surface: SurfaceId) -> Result<Vec<TriangleId>> {
        let mut out = Vec::new();
        for e in self.triangle(f)?.edges {
            for &t in &self.segment(e)?.triangles {
                if t != f && self.surface_contains(surface, t)? {
                    out.push(t);
                }
            }
        }
        Ok(out)
    }

    /// Number of faces of `surface` sharing an edge with `f`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or surface does not exist.
    pub fn neighbor_number(&self, f: TriangleId, surface: SurfaceId) -> Result<usize> {
        Ok(self.face_neighbors(f, surface)?.len())
    }

    /// Whether `f` is compatible with all its neighbors in `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or surface does not exist.
    pub fn is_face_compatible(&self, f: TriangleId, surface: SurfaceId) -> Result<bool> {
        for n in self.face_neighbors(f, surface)? {
            if !self.triangles_compatible(f, n)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
