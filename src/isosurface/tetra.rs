//! Marching tetrahedra over the Kuhn split of every grid cube.
//!
//! Each cube is cut into six tetrahedra around its main diagonal; the
//! split is the same on both sides of every cube face, so crossings on
//! face diagonals are shared. In bounded mode the grid is padded with one
//! layer of nodes whose value is `+inf`, which puts every boundary node
//! below the isovalue inside a closed surface.

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{crossing, MeshSink, ScalarGrid};

/// Kuhn tetrahedra as cube corners (bit `d` of a corner is its offset on
/// axis `d`); all share the diagonal from corner 0 to corner 7.
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Grid nodes, optionally surrounded by a virtual layer of outside nodes.
struct Lattice<'g> {
    grid: &'g ScalarGrid,
    padded: bool,
}

impl Lattice<'_> {
    fn dims(&self) -> [isize; 3] {
        #[allow(clippy::cast_possible_wrap)]
        let dims = self.grid.dimensions().map(|n| n as isize);
        dims
    }

    /// Lower corners of the cubes to visit, per axis.
    fn cells(&self) -> [std::ops::Range<isize>; 3] {
        let pad = isize::from(self.padded);
        self.dims().map(|n| -pad..n - 1 + pad)
    }

    fn value(&self, [i, j, k]: [isize; 3]) -> f64 {
        let [nx, ny, nz] = self.dims();
        if (0..nx).contains(&i) && (0..ny).contains(&j) && (0..nz).contains(&k) {
            #[allow(clippy::cast_sign_loss)]
            let value = self.grid.value(i as usize, j as usize, k as usize);
            value
        } else {
            f64::INFINITY
        }
    }

    fn position(&self, node: [isize; 3]) -> Point3 {
        let bounds = self.grid.bounds();
        let dims = self.dims();
        let coord = |axis: usize| {
            #[allow(clippy::cast_precision_loss)]
            let t = node[axis] as f64 / (dims[axis] - 1) as f64;
            bounds.min[axis] + (bounds.max[axis] - bounds.min[axis]) * t
        };
        Point3::new(coord(0), coord(1), coord(2))
    }

    /// Index of a node in the padded lattice.
    fn key(&self, [i, j, k]: [isize; 3]) -> usize {
        let [_, ny, nz] = self.dims();
        #[allow(clippy::cast_sign_loss)]
        let key = (((i + 1) * (ny + 2) + j + 1) * (nz + 2) + k + 1) as usize;
        key
    }
}

pub(super) fn extract(
    grid: &ScalarGrid,
    iso: f64,
    level: usize,
    padded: bool,
    mesh: &mut MeshSink<'_>,
) -> Result<()> {
    let lattice = Lattice { grid, padded };
    let [xs, ys, zs] = lattice.cells();
    for i in xs {
        for j in ys.clone() {
            for k in zs.clone() {
                let corners: [[isize; 3]; 8] = std::array::from_fn(|c| {
                    let bit = |d: usize| isize::from(c & (1 << d) != 0);
                    [i + bit(0), j + bit(1), k + bit(2)]
                });
                let values = corners.map(|n| lattice.value(n));
                let inside = values.map(|v| v < iso);
                if inside.iter().all(|&b| b) || inside.iter().all(|&b| !b) {
                    continue;
                }
                for tet in TETRAHEDRA {
                    let nodes = tet.map(|c| corners[c]);
                    let vals = tet.map(|c| values[c]);
                    let ins = tet.map(|c| inside[c]);
                    march(&lattice, nodes, vals, ins, iso, level, mesh)?;
                }
            }
        }
    }
    Ok(())
}

fn march(
    lattice: &Lattice<'_>,
    nodes: [[isize; 3]; 4],
    values: [f64; 4],
    inside: [bool; 4],
    iso: f64,
    level: usize,
    mesh: &mut MeshSink<'_>,
) -> Result<()> {
    let (ins, outs): (Vec<usize>, Vec<usize>) = (0..4).partition(|&n| inside[n]);
    // Crossed tetrahedron edges in cyclic order around the cut.
    let cut: Vec<(usize, usize)> = match (ins.as_slice(), outs.as_slice()) {
        ([a], [b, c, d]) | ([b, c, d], [a]) => vec![(*a, *b), (*a, *c), (*a, *d)],
        ([a, b], [c, d]) => vec![(*a, *c), (*a, *d), (*b, *d), (*b, *c)],
        _ => return Ok(()),
    };

    let positions = nodes.map(|n| lattice.position(n));
    let centroid = |set: &[usize]| {
        #[allow(clippy::cast_precision_loss)]
        let n = set.len() as f64;
        set.iter().map(|&i| positions[i].coords).sum::<Vector3>() / n
    };
    let mid = |(a, b): (usize, usize)| (positions[a].coords + positions[b].coords) / 2.0;
    let mut normal = Vector3::zeros();
    for w in 1..cut.len() - 1 {
        normal += (mid(cut[w]) - mid(cut[0])).cross(&(mid(cut[w + 1]) - mid(cut[0])));
    }
    let outward = normal.dot(&(centroid(&outs) - centroid(&ins))) > 0.0;

    let mut ids: Vec<_> = cut
        .iter()
        .map(|&(a, b)| {
            let (ka, kb) = (lattice.key(nodes[a]), lattice.key(nodes[b]));
            mesh.vertex((level, ka.min(kb), ka.max(kb)), || {
                crossing(&positions[a], values[a], &positions[b], values[b], iso)
            })
        })
        .collect();
    if !outward {
        ids.reverse();
    }
    for w in 1..ids.len() - 1 {
        mesh.triangle([ids[0], ids[w], ids[w + 1]])?;
    }
    Ok(())
}
