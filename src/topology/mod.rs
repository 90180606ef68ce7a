pub mod check;
pub mod payload;
pub mod segment;
pub mod surface;
pub mod triangle;
pub mod vertex;

pub use payload::{PayloadMap, StoreEntity};
pub use segment::{SegmentData, SegmentId, SegmentKind};
pub use surface::{SurfaceData, SurfaceId};
pub use triangle::{Stab, TriangleData, TriangleId, TriangleInput, TriangleKind};
pub use vertex::{VertexData, VertexId};

use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::{trace, warn};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::Point3;

/// Key of the segment deduplication index: kind plus the ordered vertex pair.
type SegmentKey = (SegmentKind, VertexId, VertexId);

/// Key of the triangle deduplication index: kind plus the sorted edge triple.
type TriangleKey = (TriangleKind, [SegmentId; 3]);

/// Reference to anything a point can be measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeomRef {
    /// A free position.
    Point(Point3),
    /// A stored vertex.
    Vertex(VertexId),
    /// A stored segment or edge.
    Segment(SegmentId),
    /// A stored triangle or face.
    Triangle(TriangleId),
}

/// Central arena that owns all mesh entities.
///
/// Entities reference each other via typed IDs (generational indices), so
/// the cyclic vertex/segment/triangle/surface graph never needs
/// self-referential structures. Each entity carries a count of external
/// handles; parents (segments for vertices, triangles for edges, surfaces
/// for faces) hold implicit ownership. An entity is destroyed as soon as
/// it has neither, and destruction cascades down to its children.
///
/// Back-reference lists (`segments` of a vertex, `triangles` of a segment,
/// `surfaces` of a face) never keep anything alive by themselves.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    segments: SlotMap<SegmentId, SegmentData>,
    triangles: SlotMap<TriangleId, TriangleData>,
    surfaces: SlotMap<SurfaceId, SurfaceData>,
    segment_index: HashMap<SegmentKey, SegmentId>,
    triangle_index: HashMap<TriangleKey, TriangleId>,
    checks: bool,
}

fn segment_key(kind: SegmentKind, v1: VertexId, v2: VertexId) -> SegmentKey {
    if v1 <= v2 {
        (kind, v1, v2)
    } else {
        (kind, v2, v1)
    }
}

fn triangle_key(kind: TriangleKind, edges: [SegmentId; 3]) -> TriangleKey {
    let mut sorted = edges;
    sorted.sort();
    (kind, sorted)
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the [`is_ok`](Self::is_ok) self-check after every mutation.
    ///
    /// Failures are reported through `tracing` and never turned into
    /// errors.
    #[must_use]
    pub fn with_checks(mut self, enabled: bool) -> Self {
        self.checks = enabled;
        self
    }

    fn after_mutation(&self, what: &str) {
        if self.checks {
            if let Err(problem) = self.check() {
                warn!(operation = what, %problem, "topology self-check failed");
            }
        }
    }

    // --- Accessors ---

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()).into())
    }

    /// Returns a reference to the segment data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn segment(&self, id: SegmentId) -> Result<&SegmentData> {
        self.segments
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("segment".into()).into())
    }

    /// Returns a reference to the triangle data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn triangle(&self, id: TriangleId) -> Result<&TriangleData> {
        self.triangles
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("triangle".into()).into())
    }

    /// Returns a reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, id: SurfaceId) -> Result<&SurfaceData> {
        self.surfaces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("surface".into()).into())
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()).into())
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut SegmentData> {
        self.segments
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("segment".into()).into())
    }

    fn triangle_mut(&mut self, id: TriangleId) -> Result<&mut TriangleData> {
        self.triangles
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("triangle".into()).into())
    }

    fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut SurfaceData> {
        self.surfaces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("surface".into()).into())
    }

    /// Returns `true` if the vertex is still alive.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Returns `true` if the segment is still alive.
    #[must_use]
    pub fn contains_segment(&self, id: SegmentId) -> bool {
        self.segments.contains_key(id)
    }

    /// Returns `true` if the triangle is still alive.
    #[must_use]
    pub fn contains_triangle(&self, id: TriangleId) -> bool {
        self.triangles.contains_key(id)
    }

    /// Returns `true` if the surface is still alive.
    #[must_use]
    pub fn contains_surface(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Number of live vertices in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live segments and edges in the store.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of live triangles and faces in the store.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn point(&self, id: VertexId) -> Result<Point3> {
        Ok(self.vertex(id)?.point)
    }

    /// Moves a vertex. Connectivity is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn set_point(&mut self, id: VertexId, point: Point3) -> Result<()> {
        self.vertex_mut(id)?.point = point;
        Ok(())
    }

    /// Resolves a [`GeomRef::Point`] or [`GeomRef::Vertex`] to a position.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] for segment and triangle
    /// references, or an error if the vertex does not exist.
    pub fn resolve_point(&self, target: GeomRef) -> Result<Point3> {
        match target {
            GeomRef::Point(p) => Ok(p),
            GeomRef::Vertex(v) => self.point(v),
            GeomRef::Segment(_) | GeomRef::Triangle(_) => Err(OperationError::InvalidArgument(
                "expected a point or a vertex".into(),
            )
            .into()),
        }
    }

    // --- Construction ---

    /// Creates a vertex held by one external handle.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        let id = self.vertices.insert(VertexData::new(point, 1));
        self.after_mutation("add_vertex");
        id
    }

    /// Creates a vertex owned by nobody yet; it is collected by
    /// [`collect_vertex`](Self::collect_vertex) unless something adopts it.
    pub(crate) fn new_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point, 0))
    }

    /// Creates (or returns the existing) plain segment between two vertices.
    ///
    /// The returned segment gains one external handle.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Degenerate`] if `v1 == v2`, or an error if
    /// either vertex does not exist.
    pub fn add_segment(&mut self, v1: VertexId, v2: VertexId) -> Result<SegmentId> {
        let id = self.make_segment(SegmentKind::Segment, v1, v2, 1)?;
        self.after_mutation("add_segment");
        Ok(id)
    }

    /// Creates (or returns the existing) edge between two vertices.
    ///
    /// Only edges can bound triangles. The returned edge gains one external
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Degenerate`] if `v1 == v2`, or an error if
    /// either vertex does not exist.
    pub fn add_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<SegmentId> {
        let id = self.make_segment(SegmentKind::Edge, v1, v2, 1)?;
        self.after_mutation("add_edge");
        Ok(id)
    }

    pub(crate) fn new_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<SegmentId> {
        self.make_segment(SegmentKind::Edge, v1, v2, 0)
    }

    fn make_segment(
        &mut self,
        kind: SegmentKind,
        v1: VertexId,
        v2: VertexId,
        handles: u32,
    ) -> Result<SegmentId> {
        self.vertex(v1)?;
        self.vertex(v2)?;
        if v1 == v2 {
            return Err(TopologyError::Degenerate("segment endpoints are identical".into()).into());
        }
        if let Some(&existing) = self.segment_index.get(&segment_key(kind, v1, v2)) {
            self.segment_mut(existing)?.handles += handles;
            return Ok(existing);
        }
        let id = self.segments.insert(SegmentData::new(kind, v1, v2, handles));
        self.segment_index.insert(segment_key(kind, v1, v2), id);
        self.vertex_mut(v1)?.segments.push(id);
        self.vertex_mut(v2)?.segments.push(id);
        trace!(?id, ?kind, "segment created");
        Ok(id)
    }

    /// Looks up an existing segment of `kind` between two vertices.
    #[must_use]
    pub fn find_segment(&self, kind: SegmentKind, v1: VertexId, v2: VertexId) -> Option<SegmentId> {
        self.segment_index.get(&segment_key(kind, v1, v2)).copied()
    }

    /// Creates (or returns the existing) triangle, held by one external
    /// handle. Triangles cannot be added to surfaces; see
    /// [`add_face`](Self::add_face).
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Degenerate`] if the arguments do not describe
    /// three distinct vertices joined in a cycle, or
    /// [`OperationError::InvalidArgument`] if a supplied segment is not an
    /// edge.
    pub fn add_triangle(&mut self, input: TriangleInput) -> Result<TriangleId> {
        let id = self.make_triangle(TriangleKind::Triangle, input, 1)?;
        self.after_mutation("add_triangle");
        Ok(id)
    }

    /// Creates (or returns the existing) face, held by one external handle.
    ///
    /// # Errors
    ///
    /// Same conditions as [`add_triangle`](Self::add_triangle).
    pub fn add_face(&mut self, input: TriangleInput) -> Result<TriangleId> {
        let id = self.make_triangle(TriangleKind::Face, input, 1)?;
        self.after_mutation("add_face");
        Ok(id)
    }

    /// Creates an unowned face from three vertices.
    pub(crate) fn new_face(&mut self, vertices: [VertexId; 3]) -> Result<TriangleId> {
        self.make_triangle(TriangleKind::Face, TriangleInput::Vertices(vertices), 0)
    }

    fn make_triangle(
        &mut self,
        kind: TriangleKind,
        input: TriangleInput,
        handles: u32,
    ) -> Result<TriangleId> {
        let edges = match input {
            TriangleInput::Edges(edges) => {
                self.validate_cycle(edges)?;
                edges
            }
            TriangleInput::Vertices([a, b, c]) => {
                for v in [a, b, c] {
                    self.vertex(v)?;
                }
                if a == b || b == c || c == a {
                    return Err(
                        TopologyError::Degenerate("triangle vertices are not distinct".into())
                            .into(),
                    );
                }
                let e1 = self.make_segment(SegmentKind::Edge, a, b, 0)?;
                let e2 = self.make_segment(SegmentKind::Edge, b, c, 0)?;
                let e3 = self.make_segment(SegmentKind::Edge, c, a, 0)?;
                [e1, e2, e3]
            }
        };

        let key = triangle_key(kind, edges);
        if let Some(&existing) = self.triangle_index.get(&key) {
            self.triangle_mut(existing)?.handles += handles;
            return Ok(existing);
        }
        let id = self.triangles.insert(TriangleData::new(kind, edges, handles));
        self.triangle_index.insert(key, id);
        for e in edges {
            self.segment_mut(e)?.triangles.push(id);
        }
        trace!(?id, ?kind, "triangle created");
        Ok(id)
    }

    /// Checks that three edges close a cycle through three distinct vertices.
    fn validate_cycle(&self, edges: [SegmentId; 3]) -> Result<()> {
        let mut ends = [(VertexId::default(), VertexId::default()); 3];
        for (i, &e) in edges.iter().enumerate() {
            let seg = self.segment(e)?;
            if seg.kind != SegmentKind::Edge {
                return Err(OperationError::InvalidArgument(
                    "triangles must be bounded by edges, not plain segments".into(),
                )
                .into());
            }
            ends[i] = (seg.v1, seg.v2);
        }
        let degenerate = || -> crate::error::TrisurfError {
            TopologyError::Degenerate("edges do not form a triangle".into()).into()
        };
        if edges[0] == edges[1] || edges[1] == edges[2] || edges[0] == edges[2] {
            return Err(degenerate());
        }
        let (a1, a2) = ends[0];
        let (b1, b2) = ends[1];
        let shared = if a1 == b1 || a1 == b2 {
            a1
        } else if a2 == b1 || a2 == b2 {
            a2
        } else {
            return Err(degenerate());
        };
        let first = if shared == a1 { a2 } else { a1 };
        let third = if b1 == shared { b2 } else { b1 };
        let (c1, c2) = ends[2];
        let closes = (c1 == third && c2 == first) || (c1 == first && c2 == third);
        if !closes || first == third {
            return Err(degenerate());
        }
        Ok(())
    }

    /// Creates an empty surface held by one external handle.
    pub fn add_surface(&mut self) -> SurfaceId {
        let id = self.surfaces.insert(SurfaceData::new(1));
        self.after_mutation("add_surface");
        id
    }

    // --- Handles ---

    /// Adds an external handle to a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist.
    pub fn retain_vertex(&mut self, id: VertexId) -> Result<()> {
        self.vertex_mut(id)?.handles += 1;
        Ok(())
    }

    /// Adds an external handle to a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not exist.
    pub fn retain_segment(&mut self, id: SegmentId) -> Result<()> {
        self.segment_mut(id)?.handles += 1;
        Ok(())
    }

    /// Adds an external handle to a triangle.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist.
    pub fn retain_triangle(&mut self, id: TriangleId) -> Result<()> {
        self.triangle_mut(id)?.handles += 1;
        Ok(())
    }

    /// Adds an external handle to a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn retain_surface(&mut self, id: SurfaceId) -> Result<()> {
        self.surface_mut(id)?.handles += 1;
        Ok(())
    }

    /// Drops one external handle of a vertex, destroying it if it is also
    /// unattached.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist or holds no handle.
    pub fn release_vertex(&mut self, id: VertexId) -> Result<()> {
        let v = self.vertex_mut(id)?;
        v.handles = v.handles.checked_sub(1).ok_or_else(no_handle)?;
        self.collect_vertex(id);
        self.after_mutation("release_vertex");
        Ok(())
    }

    /// Drops one external handle of a segment, destroying it (and any
    /// vertex left without owners) if nothing else holds it.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment does not exist or holds no handle.
    pub fn release_segment(&mut self, id: SegmentId) -> Result<()> {
        let s = self.segment_mut(id)?;
        s.handles = s.handles.checked_sub(1).ok_or_else(no_handle)?;
        self.collect_segment(id);
        self.after_mutation("release_segment");
        Ok(())
    }

    /// Drops one external handle of a triangle, cascading destruction.
    ///
    /// # Errors
    ///
    /// Returns an error if the triangle does not exist or holds no handle.
    pub fn release_triangle(&mut self, id: TriangleId) -> Result<()> {
        let t = self.triangle_mut(id)?;
        t.handles = t.handles.checked_sub(1).ok_or_else(no_handle)?;
        self.collect_triangle(id);
        self.after_mutation("release_triangle");
        Ok(())
    }

    /// Drops one external handle of a surface, cascading destruction to
    /// faces owned by nothing else.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist or holds no handle.
    pub fn release_surface(&mut self, id: SurfaceId) -> Result<()> {
        let s = self.surface_mut(id)?;
        s.handles = s.handles.checked_sub(1).ok_or_else(no_handle)?;
        self.collect_surface(id);
        self.after_mutation("release_surface");
        Ok(())
    }

    // --- Collection ---

    /// Destroys the vertex if it has no handle and no segment.
    pub(crate) fn collect_vertex(&mut self, id: VertexId) {
        let dead = self
            .vertices
            .get(id)
            .is_some_and(|v| v.handles == 0 && v.segments.is_empty());
        if dead {
            self.vertices.remove(id);
            trace!(?id, "vertex destroyed");
        }
    }

    /// Destroys the segment if it has no handle and no triangle.
    pub(crate) fn collect_segment(&mut self, id: SegmentId) {
        let Some(seg) = self.segments.get(id) else {
            return;
        };
        if seg.handles > 0 || !seg.triangles.is_empty() {
            return;
        }
        let (kind, v1, v2) = (seg.kind, seg.v1, seg.v2);
        self.segments.remove(id);
        self.segment_index.remove(&segment_key(kind, v1, v2));
        for v in [v1, v2] {
            if let Some(vd) = self.vertices.get_mut(v) {
                vd.segments.retain(|&s| s != id);
            }
            self.collect_vertex(v);
        }
        trace!(?id, "segment destroyed");
    }

    /// Destroys the triangle if it has no handle and no surface.
    pub(crate) fn collect_triangle(&mut self, id: TriangleId) {
        let Some(tri) = self.triangles.get(id) else {
            return;
        };
        if tri.handles > 0 || !tri.surfaces.is_empty() {
            return;
        }
        let (kind, edges) = (tri.kind, tri.edges);
        self.triangles.remove(id);
        self.triangle_index.remove(&triangle_key(kind, edges));
        for e in edges {
            if let Some(sd) = self.segments.get_mut(e) {
                sd.triangles.retain(|&t| t != id);
            }
            self.collect_segment(e);
        }
        trace!(?id, "triangle destroyed");
    }

    /// Destroys the surface if it has no handle, releasing its faces.
    pub(crate) fn collect_surface(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        if surface.handles > 0 {
            return;
        }
        let faces = surface.faces.clone();
        self.surfaces.remove(id);
        for f in faces {
            if let Some(fd) = self.triangles.get_mut(f) {
                if let Some(pos) = fd.surfaces.iter().position(|&s| s == id) {
                    fd.surfaces.swap_remove(pos);
                }
            }
            self.collect_triangle(f);
        }
        trace!(?id, "surface destroyed");
    }

    // --- Rewiring ---

    /// Rewires every segment incident to `old` onto `new`.
    ///
    /// Replacing a vertex by itself is a no-op. The replacement is atomic:
    /// if any segment would become degenerate or duplicate an existing one,
    /// nothing is changed. Afterwards `old` is unattached and is destroyed
    /// unless an external handle holds it.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Degenerate`] on a conflicting rewiring, or an
    /// error if either vertex does not exist.
    pub fn replace_vertex(&mut self, old: VertexId, new: VertexId) -> Result<()> {
        self.vertex(old)?;
        self.vertex(new)?;
        if old == new {
            return Ok(());
        }
        let incident = self.vertex(old)?.segments.clone();
        for &s in &incident {
            let seg = self.segment(s)?;
            let other = seg.other(old);
            if other == new {
                return Err(TopologyError::Degenerate(
                    "replacement collapses a segment to a point".into(),
                )
                .into());
            }
            if self.segment_index.contains_key(&segment_key(seg.kind, new, other)) {
                return Err(TopologyError::Degenerate(
                    "replacement duplicates an existing segment".into(),
                )
                .into());
            }
        }

        for &s in &incident {
            let seg = self.segment_mut(s)?;
            let (kind, v1, v2) = (seg.kind, seg.v1, seg.v2);
            if seg.v1 == old {
                seg.v1 = new;
            } else {
                seg.v2 = new;
            }
            let (n1, n2) = (seg.v1, seg.v2);
            self.segment_index.remove(&segment_key(kind, v1, v2));
            self.segment_index.insert(segment_key(kind, n1, n2), s);
            self.vertex_mut(new)?.segments.push(s);
        }
        self.vertex_mut(old)?.segments.clear();
        self.collect_vertex(old);
        self.after_mutation("replace_vertex");
        Ok(())
    }

    // --- Helpers over id lists ---

    /// Unique segments having at least one endpoint in `vertices`.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex does not exist.
    pub fn segments_of(&self, vertices: &[VertexId]) -> Result<Vec<SegmentId>> {
        let mut out = Vec::new();
        for &v in vertices {
            for &s in &self.vertex(v)?.segments {
                if !out.contains(&s) {
                    out.push(s);
                }
            }
        }
        Ok(out)
    }

    /// Unique endpoints of `segments`, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment does not exist.
    pub fn vertices_of(&self, segments: &[SegmentId]) -> Result<Vec<VertexId>> {
        let mut out = Vec::new();
        for &s in segments {
            let seg = self.segment(s)?;
            for v in [seg.v1, seg.v2] {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Unique triangles (and faces) bounded by any of `edges`.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge does not exist.
    pub fn triangles_of(&self, edges: &[SegmentId]) -> Result<Vec<TriangleId>> {
        let mut out = Vec::new();
        for &e in edges {
            for &t in &self.segment(e)?.triangles {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        Ok(out)
    }

    /// Creates a triangle whose xy-projection strictly encloses every point.
    ///
    /// The triangle lies in the plane `z = 0` and is counter-clockwise seen
    /// from `+z`. Its vertices and edges are new.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `points` is empty.
    pub fn triangle_enclosing(&mut self, points: &[Point3]) -> Result<TriangleId> {
        let Some(first) = points.first() else {
            return Err(OperationError::InvalidArgument("no points to enclose".into()).into());
        };
        let (mut xmin, mut xmax, mut ymin, mut ymax) = (first.x, first.x, first.y, first.y);
        for p in points {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
            ymin = ymin.min(p.y);
            ymax = ymax.max(p.y);
        }
        let margin = ((xmax - xmin).max(ymax - ymin)).max(1.0);
        let (x0, x1) = (xmin - margin, xmax + margin);
        let y0 = ymin - margin;
        let width = x1 - x0;
        let height = (ymax + margin) - y0;
        // A right triangle with legs 2w and 2h covers the w x h box.
        let a = self.new_vertex(Point3::new(x0, y0, 0.0));
        let b = self.new_vertex(Point3::new(x0 + 2.0 * width, y0, 0.0));
        let c = self.new_vertex(Point3::new(x0, y0 + 2.0 * height, 0.0));
        let id = self.make_triangle(TriangleKind::Triangle, TriangleInput::Vertices([a, b, c]), 1)?;
        self.after_mutation("triangle_enclosing");
        Ok(id)
    }
}

fn no_handle() -> crate::error::TrisurfError {
    OperationError::InvalidArgument("entity holds no external handle".into()).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn segments_are_deduplicated() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 1.0, 1.0));
        let s1 = store.add_segment(v1, v2).unwrap();
        let s2 = store.add_segment(v2, v1).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(store.segment_count(), 1);
        assert!(!store.is_unattached_vertex(v1).unwrap());
    }

    #[test]
    fn degenerate_segment_is_rejected() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(p(0.0, 0.0, 0.0));
        let err = store.add_segment(v, v).unwrap_err();
        assert!(err.is_degenerate());
        assert_eq!(store.segment_count(), 0);
    }

    #[test]
    fn releasing_segment_detaches_vertices() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 0.0, 0.0));
        let s = store.add_segment(v1, v2).unwrap();
        store.release_segment(s).unwrap();
        assert!(!store.contains_segment(s));
        assert!(store.is_unattached_vertex(v1).unwrap());
        assert!(store.is_unattached_vertex(v2).unwrap());
    }

    #[test]
    fn segment_keeps_released_vertices_alive() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 1.0, 1.0));
        let s = store.add_segment(v1, v2).unwrap();
        store.release_vertex(v1).unwrap();
        store.release_vertex(v2).unwrap();
        assert!(store.contains_vertex(v1));
        let seg = store.segment(s).unwrap();
        let d = (store.point(seg.v1).unwrap() - store.point(seg.v2).unwrap()).norm();
        assert!((d - 3.0_f64.sqrt()).abs() < 1e-12);

        store.release_segment(s).unwrap();
        assert!(!store.contains_vertex(v1));
        assert!(!store.contains_vertex(v2));
    }

    #[test]
    fn releasing_without_handle_fails() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(p(0.0, 0.0, 0.0));
        store.retain_vertex(v).unwrap();
        store.release_vertex(v).unwrap();
        store.release_vertex(v).unwrap();
        assert!(!store.contains_vertex(v));
        assert!(store.release_vertex(v).is_err());
    }

    #[test]
    fn triangle_from_edges_in_any_order() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(0.0, 1.0, 0.0));
        let v3 = store.add_vertex(p(0.0, 0.0, 1.0));
        let e1 = store.add_edge(v1, v2).unwrap();
        let e2 = store.add_edge(v2, v3).unwrap();
        let e3 = store.add_edge(v1, v3).unwrap();
        for edges in [[e1, e2, e3], [e1, e3, e2], [e3, e1, e2]] {
            let t = store.add_triangle(TriangleInput::Edges(edges)).unwrap();
            let mut vs = store.triangle_vertices(t).unwrap().to_vec();
            vs.sort();
            let mut expected = vec![v1, v2, v3];
            expected.sort();
            assert_eq!(vs, expected);
        }
        // Same edge set every time.
        assert_eq!(store.triangle_count(), 1);
    }

    #[test]
    fn non_connecting_edges_are_rejected() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(0.0, 1.0, 0.0));
        let v3a = store.add_vertex(p(0.0, 0.0, 1.0));
        let v3b = store.add_vertex(p(0.0, 0.0, 1.0));
        let e1 = store.add_edge(v1, v2).unwrap();
        let e2 = store.add_edge(v2, v3a).unwrap();
        let e3 = store.add_edge(v1, v3b).unwrap();
        let err = store.add_triangle(TriangleInput::Edges([e1, e2, e3])).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn plain_segments_cannot_bound_triangles() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(0.0, 1.0, 0.0));
        let v3 = store.add_vertex(p(0.0, 0.0, 1.0));
        let s1 = store.add_segment(v1, v2).unwrap();
        let e2 = store.add_edge(v2, v3).unwrap();
        let e3 = store.add_edge(v3, v1).unwrap();
        let err = store.add_triangle(TriangleInput::Edges([s1, e2, e3])).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn triangle_from_vertices_reuses_edges() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v3 = store.add_vertex(p(0.0, 1.0, 0.0));
        let e = store.add_edge(v1, v2).unwrap();
        let t = store.add_triangle(TriangleInput::Vertices([v1, v2, v3])).unwrap();
        assert_eq!(store.triangle(t).unwrap().edges[0], e);
        assert_eq!(store.segment_count(), 3);
        assert!(!store.is_unattached_segment(e).unwrap());

        store.release_triangle(t).unwrap();
        assert!(store.is_unattached_segment(e).unwrap());
        // The auto-created edges had no other owner.
        assert_eq!(store.segment_count(), 1);
    }

    #[test]
    fn replace_rewires_segments() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v3 = store.add_vertex(p(2.0, 0.0, 0.0));
        let s = store.add_segment(v1, v2).unwrap();

        store.replace_vertex(v1, v3).unwrap();
        assert_eq!(store.segment(s).unwrap().v1, v3);
        assert!(store.is_unattached_vertex(v1).unwrap());
        assert_eq!(store.find_segment(SegmentKind::Segment, v3, v2), Some(s));
        assert_eq!(store.find_segment(SegmentKind::Segment, v1, v2), None);

        store.replace_vertex(v3, v3).unwrap();
        assert_eq!(store.segment(s).unwrap().v1, v3);
    }

    #[test]
    fn replace_that_collapses_a_segment_is_rejected() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 1.0, 1.0));
        let s = store.add_segment(v1, v2).unwrap();
        let err = store.replace_vertex(v1, v2).unwrap_err();
        assert!(err.is_degenerate());
        assert_eq!(store.segment(s).unwrap().v1, v1);
    }

    #[test]
    fn replace_that_duplicates_a_segment_is_rejected() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(0.0, 0.0, 0.0));
        let b = store.add_vertex(p(1.0, 0.0, 0.0));
        let c = store.add_vertex(p(2.0, 0.0, 0.0));
        store.add_segment(a, c).unwrap();
        store.add_segment(b, c).unwrap();
        assert!(store.replace_vertex(a, b).unwrap_err().is_degenerate());
        assert!(store.is_ok());
    }

    #[test]
    fn helper_lists() {
        let mut store = TopologyStore::new();
        let v1 = store.add_vertex(p(0.0, 0.0, 0.0));
        let v2 = store.add_vertex(p(1.0, 0.0, 0.0));
        let v3 = store.add_vertex(p(2.0, 0.0, 0.0));
        let s1 = store.add_segment(v1, v2).unwrap();
        let s2 = store.add_edge(v2, v3).unwrap();
        let s3 = store.add_edge(v1, v3).unwrap();
        assert_eq!(store.segments_of(&[v1, v2, v3]).unwrap().len(), 3);
        assert_eq!(store.segments_of(&[v1]).unwrap(), vec![s1, s3]);
        let vs = store.vertices_of(&[s1, s2, s3]).unwrap();
        assert_eq!(vs.len(), 3);
    }

    #[test]
    fn enclosing_triangle_contains_points() {
        let mut store = TopologyStore::new();
        let points = [
            p(-1.0, -1.0, 0.0),
            p(-1.0, 1.0, 0.0),
            p(1.0, -1.0, 0.0),
            p(1.0, 1.0, 0.0),
        ];
        let t = store.triangle_enclosing(&points).unwrap();
        for q in &points {
            assert_eq!(store.point_in_triangle(q, t).unwrap(), 1);
        }
    }
}
