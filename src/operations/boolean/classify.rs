use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::operations::modification::UnionFind;
use crate::operations::query::winding_number;
use crate::topology::{TopologyStore, TriangleId};

use super::face_intersection::{edge_key, PointTable};
use super::select::{Location, Operand};
use super::split::{piece_area, piece_centroid, Piece};

/// Locates every piece relative to the operand it does not come from.
///
/// Pieces connected through edges that are not on the intersection curve
/// share a location, so each such region is classified once, by the
/// winding number of the other operand at the centroid of its largest
/// piece.
///
/// # Errors
///
/// Returns an error if a face of either operand cannot be read.
pub fn locate_pieces(
    store: &TopologyStore,
    table: &PointTable,
    pieces: &[Piece],
    cut_edges: &HashSet<[usize; 2]>,
    first_faces: &[TriangleId],
    second_faces: &[TriangleId],
) -> Result<Vec<Location>> {
    let mut regions = UnionFind::new(pieces.len());
    let mut by_edge: HashMap<(Operand, [usize; 2]), usize> = HashMap::new();
    for (i, piece) in pieces.iter().enumerate() {
        let v = piece.vertices;
        for k in 0..3 {
            let key = edge_key(v[k], v[(k + 1) % 3]);
            if cut_edges.contains(&key) {
                continue;
            }
            match by_edge.get(&(piece.source, key)) {
                Some(&j) => regions.union(i, j),
                None => {
                    by_edge.insert((piece.source, key), i);
                }
            }
        }
    }

    let mut largest: HashMap<usize, (usize, f64)> = HashMap::new();
    for (i, piece) in pieces.iter().enumerate() {
        let area = piece_area(table, piece);
        let slot = largest.entry(regions.find(i)).or_insert((i, area));
        if area > slot.1 {
            *slot = (i, area);
        }
    }

    let mut region_location = HashMap::with_capacity(largest.len());
    for (&root, &(i, _)) in &largest {
        let piece = &pieces[i];
        let faces = match piece.source {
            Operand::First => second_faces,
            Operand::Second => first_faces,
        };
        let w = winding_number(store, faces, &piece_centroid(table, piece))?;
        let location = if w.abs() > 0.5 {
            Location::Inside
        } else {
            Location::Outside
        };
        region_location.insert(root, location);
    }

    Ok((0..pieces.len())
        .map(|i| {
            region_location
                .get(&regions.find(i))
                .copied()
                .unwrap_or(Location::Outside)
        })
        .collect())
}
