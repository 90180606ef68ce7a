use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::math::intersect_3d::{segment_touches_triangle, segment_triangle, SegmentTriangleHit};
use crate::math::{Aabb, Bvh, Point3};
use crate::operations::modification::{cell_of, neighbor_cells};
use crate::topology::{SurfaceId, TopologyStore, TriangleId, VertexId};

use super::select::Operand;

const LEAF_SIZE: usize = 8;

/// Coordinates shared by both operands, addressed by index.
///
/// Input vertices are stored as they are; intersection points are welded
/// onto any stored point closer than the tolerance.
#[derive(Debug)]
pub struct PointTable {
    points: Vec<Point3>,
    cells: HashMap<[i64; 3], Vec<usize>>,
    tolerance: f64,
}

impl PointTable {
    pub fn new(tolerance: f64) -> Self {
        Self {
            points: Vec::new(),
            cells: HashMap::new(),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, i: usize) -> &Point3 {
        &self.points[i]
    }

    /// Stores `p` without welding.
    pub fn push(&mut self, p: Point3) -> usize {
        let i = self.points.len();
        self.cells.entry(cell_of(&p, self.tolerance)).or_default().push(i);
        self.points.push(p);
        i
    }

    /// Returns the nearest stored point within tolerance of `p`, storing
    /// `p` if there is none.
    pub fn weld(&mut self, p: Point3) -> usize {
        let tol2 = self.tolerance * self.tolerance;
        let mut best: Option<(usize, f64)> = None;
        for cell in neighbor_cells(cell_of(&p, self.tolerance), true) {
            for &j in self.cells.get(&cell).into_iter().flatten() {
                let d2 = (self.points[j] - p).norm_squared();
                if d2 <= tol2 && best.is_none_or(|(_, b)| d2 < b) {
                    best = Some((j, d2));
                }
            }
        }
        match best {
            Some((j, _)) => j,
            None => self.push(p),
        }
    }
}

/// One operand flattened onto the shared point table.
#[derive(Debug)]
pub struct OperandMesh {
    pub operand: Operand,
    pub faces: Vec<TriangleId>,
    /// Point indices of each face, in orientation order.
    pub triangles: Vec<[usize; 3]>,
    pub boxes: Vec<Aabb>,
}

impl OperandMesh {
    pub fn load(
        store: &TopologyStore,
        surface: SurfaceId,
        operand: Operand,
        table: &mut PointTable,
        index: &mut HashMap<VertexId, usize>,
    ) -> Result<Self> {
        let faces = store.surface_faces(surface)?.to_vec();
        let mut triangles = Vec::with_capacity(faces.len());
        let mut boxes = Vec::with_capacity(faces.len());
        for &f in &faces {
            let vs = store.triangle_vertices(f)?;
            let mut tri = [0; 3];
            for (slot, v) in tri.iter_mut().zip(vs) {
                *slot = match index.get(&v) {
                    Some(&i) => i,
                    None => {
                        let i = table.push(store.point(v)?);
                        index.insert(v, i);
                        i
                    }
                };
            }
            boxes.push(Aabb::from_points(tri.iter().map(|&i| table.point(i))));
            triangles.push(tri);
        }
        Ok(Self {
            operand,
            faces,
            triangles,
            boxes,
        })
    }
}

/// Unordered key of the segment between two points.
pub fn edge_key(a: usize, b: usize) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

/// Intersection points and segments, attached to the faces and edges of
/// the operands they lie on.
#[derive(Debug, Default)]
pub struct Cuts {
    /// Points in the relative interior of an operand edge.
    pub edge_points: HashMap<(Operand, [usize; 2]), Vec<usize>>,
    /// Points in the interior of an operand face (by face index).
    pub interior_points: HashMap<(Operand, usize), Vec<usize>>,
    /// Pieces of the intersection curve crossing an operand face.
    pub segments: HashMap<(Operand, usize), Vec<[usize; 2]>>,
}

impl Cuts {
    pub fn is_empty(&self) -> bool {
        self.edge_points.is_empty() && self.interior_points.is_empty() && self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum::<usize>() / 2
    }

    fn add_edge_point(&mut self, operand: Operand, key: [usize; 2], point: usize) {
        if point != key[0] && point != key[1] {
            let list = self.edge_points.entry((operand, key)).or_default();
            if !list.contains(&point) {
                list.push(point);
            }
        }
    }

    fn add_interior_point(&mut self, operand: Operand, face: usize, tri: &[usize; 3], point: usize) {
        if !tri.contains(&point) {
            let list = self.interior_points.entry((operand, face)).or_default();
            if !list.contains(&point) {
                list.push(point);
            }
        }
    }
}

/// Intersects every face of `first` with every face of `second`.
///
/// # Errors
///
/// Returns [`OperationError::MutualIntersection`] when an edge of one
/// operand lies in the plane of a face of the other and touches it.
pub fn intersect_operands(first: &OperandMesh, second: &OperandMesh, table: &mut PointTable) -> Result<Cuts> {
    let tol = table.tolerance();
    let boxes: Vec<Aabb> = second.boxes.iter().map(|b| b.inflated(tol)).collect();
    let bvh = Bvh::build(&boxes, LEAF_SIZE);
    let mut cuts = Cuts::default();
    for (ta, bbox) in first.boxes.iter().enumerate() {
        for tb in bvh.overlapping(&bbox.inflated(tol), &boxes) {
            intersect_pair(first, ta, second, tb, table, &mut cuts)?;
        }
    }
    Ok(cuts)
}

fn intersect_pair(
    first: &OperandMesh,
    ta: usize,
    second: &OperandMesh,
    tb: usize,
    table: &mut PointTable,
    cuts: &mut Cuts,
) -> Result<()> {
    let mut found = Vec::new();
    edges_against(first, ta, second, tb, table, cuts, &mut found)?;
    edges_against(second, tb, first, ta, table, cuts, &mut found)?;
    found.sort_unstable();
    found.dedup();
    if found.len() < 2 {
        return Ok(());
    }

    let normal = |tri: &[usize; 3]| {
        let [a, b, c] = tri.map(|i| *table.point(i));
        (b - a).cross(&(c - a))
    };
    let direction = normal(&first.triangles[ta]).cross(&normal(&second.triangles[tb]));
    found.sort_by(|&i, &j| {
        table.point(i).coords.dot(&direction).total_cmp(&table.point(j).coords.dot(&direction))
    });
    for pair in found.windows(2) {
        let seg = [pair[0], pair[1]];
        cuts.segments.entry((first.operand, ta)).or_default().push(seg);
        cuts.segments.entry((second.operand, tb)).or_default().push(seg);
    }
    Ok(())
}

/// Intersects the three edges of face `s` of `src` with face `d` of `dst`.
fn edges_against(
    src: &OperandMesh,
    s: usize,
    dst: &OperandMesh,
    d: usize,
    table: &mut PointTable,
    cuts: &mut Cuts,
    found: &mut Vec<usize>,
) -> Result<()> {
    let tri_s = src.triangles[s];
    let tri_d = dst.triangles[d];
    let [a, b, c] = tri_d.map(|i| *table.point(i));
    for k in 0..3 {
        // Canonical endpoint order, so both faces of the edge compute the
        // same coordinates.
        let key = edge_key(tri_s[k], tri_s[(k + 1) % 3]);
        let (p, q) = (*table.point(key[0]), *table.point(key[1]));
        let point = match segment_triangle(&p, &q, &a, &b, &c) {
            SegmentTriangleHit::Miss => continue,
            SegmentTriangleHit::Coplanar => {
                if segment_touches_triangle(&p, &q, [&a, &b, &c]) {
                    return Err(OperationError::MutualIntersection(
                        "an edge lies on a face of the other surface".into(),
                    )
                    .into());
                }
                continue;
            }
            SegmentTriangleHit::Vertex(i) => tri_d[i],
            SegmentTriangleHit::Edge(i, x) => {
                let x = table.weld(x);
                cuts.add_edge_point(dst.operand, edge_key(tri_d[i], tri_d[(i + 1) % 3]), x);
                x
            }
            SegmentTriangleHit::Interior(x) => {
                let x = table.weld(x);
                cuts.add_interior_point(dst.operand, d, &tri_d, x);
                x
            }
        };
        cuts.add_edge_point(src.operand, key, point);
        found.push(point);
    }
    Ok(())
}
