//! Dual contouring in its surface-nets form.
//!
//! Every cube with a sign change gets one vertex, the mean of the
//! crossings on its edges. Every crossed grid edge with four surrounding
//! cubes emits the quad joining their vertices, split in two triangles.

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{crossing, MeshSink, ScalarGrid};

/// Cube edges as corner offsets, four along each axis.
const EDGES: [([usize; 3], [usize; 3]); 12] = [
    ([0, 0, 0], [1, 0, 0]),
    ([0, 1, 0], [1, 1, 0]),
    ([0, 0, 1], [1, 0, 1]),
    ([0, 1, 1], [1, 1, 1]),
    ([0, 0, 0], [0, 1, 0]),
    ([1, 0, 0], [1, 1, 0]),
    ([0, 0, 1], [0, 1, 1]),
    ([1, 0, 1], [1, 1, 1]),
    ([0, 0, 0], [0, 0, 1]),
    ([1, 0, 0], [1, 0, 1]),
    ([0, 1, 0], [0, 1, 1]),
    ([1, 1, 0], [1, 1, 1]),
];

/// Cubes around an edge along axis `d`: how far each one's lower corner
/// steps back from the edge along `(u, v) = (d + 1, d + 2)`. The ring turns
/// counter-clockwise about `+d`.
const RING: [(usize, usize); 4] = [(1, 1), (0, 1), (0, 0), (1, 0)];

pub(super) fn extract(grid: &ScalarGrid, iso: f64, level: usize, mesh: &mut MeshSink<'_>) -> Result<()> {
    let dims = grid.dimensions();
    for i in 0..dims[0] {
        for j in 0..dims[1] {
            for k in 0..dims[2] {
                let node = [i, j, k];
                let below = grid.value(i, j, k) < iso;
                for d in 0..3 {
                    let (u, v) = ((d + 1) % 3, (d + 2) % 3);
                    let interior = |a: usize| node[a] > 0 && node[a] + 1 < dims[a];
                    if node[d] + 1 >= dims[d] || !interior(u) || !interior(v) {
                        continue;
                    }
                    let mut upper = node;
                    upper[d] += 1;
                    if (grid.value(upper[0], upper[1], upper[2]) < iso) == below {
                        continue;
                    }

                    let mut ids = RING.map(|(du, dv)| {
                        let mut cell = node;
                        cell[u] -= du;
                        cell[v] -= dv;
                        let key = grid.index(cell[0], cell[1], cell[2]);
                        mesh.vertex((level, key, key), || cell_point(grid, cell, iso))
                    });
                    if !below {
                        ids.reverse();
                    }
                    mesh.triangle([ids[0], ids[1], ids[2]])?;
                    mesh.triangle([ids[0], ids[2], ids[3]])?;
                }
            }
        }
    }
    Ok(())
}

/// Mean of the crossings on the edges of the cube with lower corner `cell`.
fn cell_point(grid: &ScalarGrid, [i, j, k]: [usize; 3], iso: f64) -> Point3 {
    let mut sum = Vector3::zeros();
    let mut n = 0.0;
    for ([ai, aj, ak], [bi, bj, bk]) in EDGES {
        let (a, b) = ([i + ai, j + aj, k + ak], [i + bi, j + bj, k + bk]);
        let va = grid.value(a[0], a[1], a[2]);
        let vb = grid.value(b[0], b[1], b[2]);
        if (va < iso) != (vb < iso) {
            let pa = grid.position(a[0], a[1], a[2]);
            let pb = grid.position(b[0], b[1], b[2]);
            sum += crossing(&pa, va, &pb, vb, iso).coords;
            n += 1.0;
        }
    }
    if n == 0.0 {
        return grid.position(i, j, k);
    }
    Point3::from(sum / n)
}
