//! Marching cubes by tracing the isoline across the six faces of a cube.
//!
//! On every cube face the crossings are visited counter-clockwise (seen
//! from outside the cube). A segment runs from each entry crossing
//! (outside to inside) to an exit crossing, leaving the inside corners on
//! its right. Neighbouring cubes walk a shared face in opposite directions
//! and pair its crossings the same way, so their segments cancel and the
//! resulting surface is watertight and consistently oriented.

use crate::error::Result;

use super::{crossing, MeshSink, ScalarGrid};

/// Corner `c` of a cube sits at offset `(c & 1, (c >> 1) & 1, (c >> 2) & 1)`.
const OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Corners of each cube face, counter-clockwise seen from outside.
const FACES: [[usize; 4]; 6] = [
    [0, 4, 6, 2],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 2, 3, 1],
    [4, 5, 7, 6],
];

/// A crossed cube edge, as the pair of its corners.
type CubeEdge = (usize, usize);

fn cube_edge(a: usize, b: usize) -> CubeEdge {
    (a.min(b), a.max(b))
}

pub(super) fn extract(grid: &ScalarGrid, iso: f64, level: usize, mesh: &mut MeshSink<'_>) -> Result<()> {
    let [nx, ny, nz] = grid.dimensions();
    for i in 0..nx - 1 {
        for j in 0..ny - 1 {
            for k in 0..nz - 1 {
                let nodes = OFFSETS.map(|[di, dj, dk]| [i + di, j + dj, k + dk]);
                let values = nodes.map(|[a, b, c]| grid.value(a, b, c));
                let inside = values.map(|v| v < iso);
                if inside.iter().all(|&b| b) || inside.iter().all(|&b| !b) {
                    continue;
                }

                for polygon in cube_loops(&values, &inside, iso) {
                    let ids: Vec<_> = polygon
                        .iter()
                        .map(|&(a, b)| {
                            let (na, nb) = (nodes[a], nodes[b]);
                            let (la, lb) = (grid.index(na[0], na[1], na[2]), grid.index(nb[0], nb[1], nb[2]));
                            mesh.vertex((level, la.min(lb), la.max(lb)), || {
                                let pa = grid.position(na[0], na[1], na[2]);
                                let pb = grid.position(nb[0], nb[1], nb[2]);
                                crossing(&pa, values[a], &pb, values[b], iso)
                            })
                        })
                        .collect();
                    for w in 1..ids.len() - 1 {
                        mesh.triangle([ids[0], ids[w], ids[w + 1]])?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Closed loops of crossed edges, each ordered so that its fan points its
/// normal from the inside corners toward the outside ones.
fn cube_loops(values: &[f64; 8], inside: &[bool; 8], iso: f64) -> Vec<Vec<CubeEdge>> {
    let mut next: Vec<(CubeEdge, CubeEdge)> = Vec::with_capacity(12);
    for face in FACES {
        // (edge, is_entry) in counter-clockwise order.
        let mut hits: Vec<(CubeEdge, bool)> = Vec::with_capacity(4);
        for w in 0..4 {
            let (a, b) = (face[w], face[(w + 1) % 4]);
            if inside[a] != inside[b] {
                hits.push((cube_edge(a, b), inside[b]));
            }
        }
        match hits.len() {
            2 => {
                let (entry, exit) = if hits[0].1 { (hits[0].0, hits[1].0) } else { (hits[1].0, hits[0].0) };
                next.push((entry, exit));
            }
            4 => {
                let joined = face_center_inside(face.map(|c| values[c]), iso);
                for w in 0..4 {
                    if hits[w].1 {
                        let exit = if joined { hits[(w + 3) % 4].0 } else { hits[(w + 1) % 4].0 };
                        next.push((hits[w].0, exit));
                    }
                }
            }
            _ => {}
        }
    }

    let mut loops = Vec::new();
    let mut used = vec![false; next.len()];
    for start in 0..next.len() {
        if used[start] {
            continue;
        }
        let mut polygon = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            polygon.push(next[current].0);
            let tip = next[current].1;
            match (0..next.len()).find(|&w| !used[w] && next[w].0 == tip) {
                Some(w) => current = w,
                None => break,
            }
        }
        if polygon.len() >= 3 {
            loops.push(polygon);
        }
    }
    loops
}

/// Bilinear value at the face center against `iso`, summed in sorted order
/// so both cubes sharing the face agree.
fn face_center_inside(mut corners: [f64; 4], iso: f64) -> bool {
    corners.sort_by(f64::total_cmp);
    corners.iter().sum::<f64>() / 4.0 < iso
}
