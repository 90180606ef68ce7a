use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};
use tracing::warn;

use crate::error::{OperationError, Result};
use crate::math::intersect_3d::project_to_dominant_plane;
use crate::math::predicates::orient2d;
use crate::math::Point3;

use super::face_intersection::{edge_key, Cuts, OperandMesh, PointTable};
use super::select::Operand;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// A triangle of the subdivided operands, as point-table indices in the
/// orientation of the face it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub vertices: [usize; 3],
    pub source: Operand,
}

/// Subdivides every face of `mesh` touched by the intersection curve so
/// that the curve runs along piece edges. Untouched faces become a single
/// piece.
///
/// Curve segments actually inserted are added to `cut_edges`.
///
/// # Errors
///
/// Returns an error if a face cannot be triangulated.
pub fn split_operand(
    mesh: &OperandMesh,
    table: &PointTable,
    cuts: &Cuts,
    cut_edges: &mut HashSet<[usize; 2]>,
) -> Result<Vec<Piece>> {
    let op = mesh.operand;
    let mut pieces = Vec::with_capacity(mesh.triangles.len());
    let none: &[usize] = &[];
    for (t, tri) in mesh.triangles.iter().enumerate() {
        let on_edges = [0, 1, 2].map(|k| {
            cuts.edge_points
                .get(&(op, edge_key(tri[k], tri[(k + 1) % 3])))
                .map_or(none, Vec::as_slice)
        });
        let interior = cuts.interior_points.get(&(op, t)).map_or(none, Vec::as_slice);
        let segments = cuts.segments.get(&(op, t)).map_or(&[][..], Vec::as_slice);
        if on_edges.iter().all(|e| e.is_empty()) && interior.is_empty() && segments.is_empty() {
            pieces.push(Piece {
                vertices: *tri,
                source: op,
            });
            continue;
        }
        for vertices in retriangulate(tri, on_edges, interior, segments, table, cut_edges)? {
            pieces.push(Piece { vertices, source: op });
        }
    }
    Ok(pieces)
}

/// Constrained Delaunay triangulation of one face with its edge points,
/// interior points and curve segments, in the face's own orientation.
fn retriangulate(
    tri: &[usize; 3],
    on_edges: [&[usize]; 3],
    interior: &[usize],
    segments: &[[usize; 2]],
    table: &PointTable,
    cut_edges: &mut HashSet<[usize; 2]>,
) -> Result<Vec<[usize; 3]>> {
    let [a, b, c] = tri.map(|i| *table.point(i));
    let normal = (b - a).cross(&(c - a));
    let project = |i: usize| project_to_dominant_plane(&normal, table.point(i));
    let turn = orient2d(&project(tri[0]), &project(tri[1]), &project(tri[2]));
    if turn == 0.0 {
        warn!("collinear face crossed by the intersection curve kept whole");
        return Ok(vec![*tri]);
    }

    // Boundary loop: corners with the points of each edge in between.
    let mut boundary = Vec::new();
    for k in 0..3 {
        let (from, to) = (tri[k], tri[(k + 1) % 3]);
        boundary.push(from);
        let origin = table.point(from);
        let dir = table.point(to) - origin;
        let mut points = on_edges[k].to_vec();
        points.sort_by(|&i, &j| {
            (table.point(i) - origin)
                .dot(&dir)
                .total_cmp(&(table.point(j) - origin).dot(&dir))
        });
        boundary.extend(points);
    }

    let mut cdt = Cdt::new();
    let mut to_point: HashMap<usize, usize> = HashMap::new();
    let mut handles: HashMap<usize, FixedVertexHandle> = HashMap::new();
    for &i in boundary.iter().chain(interior) {
        if handles.contains_key(&i) {
            continue;
        }
        let q = project(i);
        let h = cdt
            .insert(SpadePoint2::new(q.x, q.y))
            .map_err(|e: InsertionError| OperationError::Failed(format!("CDT insert: {e}")))?;
        to_point.entry(h.index()).or_insert(i);
        handles.insert(i, h);
    }

    let mut loop_edges = HashSet::new();
    for k in 0..boundary.len() {
        let (from, to) = (handles[&boundary[k]], handles[&boundary[(k + 1) % boundary.len()]]);
        if from != to {
            cdt.add_constraint(from, to);
            loop_edges.insert(edge_key(to_point[&from.index()], to_point[&to.index()]));
        }
    }
    for &[i, j] in segments {
        let (Some(&from), Some(&to)) = (handles.get(&i), handles.get(&j)) else {
            continue;
        };
        if from == to {
            continue;
        }
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        } else {
            warn!(i, j, "intersection segment crosses an existing constraint, skipped");
        }
    }

    for edge in cdt.undirected_edges() {
        if cdt.is_constraint_edge(edge.fix()) {
            let [u, v] = edge.vertices().map(|vh| to_point[&vh.fix().index()]);
            let key = edge_key(u, v);
            if !loop_edges.contains(&key) {
                cut_edges.insert(key);
            }
        }
    }

    let inside = faces_inside_loop(&cdt, &to_point, &loop_edges);
    let mut out = Vec::new();
    for face in cdt.inner_faces() {
        if !inside.contains(&face.fix().index()) {
            continue;
        }
        let [u, v, w] = face.vertices().map(|vh| to_point[&vh.fix().index()]);
        if u == v || v == w || w == u {
            continue;
        }
        // Spade faces turn counterclockwise in the projection.
        out.push(if turn > 0.0 { [u, v, w] } else { [u, w, v] });
    }
    Ok(out)
}

/// Flood-fills the triangulation from its hull, toggling parity each time
/// a boundary-loop edge is crossed. Odd parity is inside the face.
fn faces_inside_loop(
    cdt: &Cdt,
    to_point: &HashMap<usize, usize>,
    loop_edges: &HashSet<[usize; 2]>,
) -> HashSet<usize> {
    let is_loop = |from: usize, to: usize| loop_edges.contains(&edge_key(to_point[&from], to_point[&to]));
    let mut inside = HashSet::new();
    let mut parity: HashMap<usize, bool> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, bool)> = VecDeque::new();

    let outer = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if parity.contains_key(&idx) {
                continue;
            }
            let odd = is_loop(edge.from().fix().index(), edge.to().fix().index());
            parity.insert(idx, odd);
            queue.push_back((inner.fix(), odd));
        }
    }

    while let Some((fix, odd)) = queue.pop_front() {
        if odd {
            inside.insert(fix.index());
        }
        for edge in cdt.face(fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if parity.contains_key(&idx) {
                continue;
            }
            let crossed = is_loop(edge.from().fix().index(), edge.to().fix().index());
            let next = odd ^ crossed;
            parity.insert(idx, next);
            queue.push_back((neighbor.fix(), next));
        }
    }
    inside
}

/// Area of a piece.
pub fn piece_area(table: &PointTable, piece: &Piece) -> f64 {
    let [a, b, c] = piece.vertices.map(|i| *table.point(i));
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Centroid of a piece.
pub fn piece_centroid(table: &PointTable, piece: &Piece) -> Point3 {
    let [a, b, c] = piece.vertices.map(|i| *table.point(i));
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}
