use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{TopologyStore, VertexId};

/// Groups vertices lying within `epsilon` of each other, transitively.
///
/// The query is pure: it only reports which vertices would survive a merge.
/// Each group is represented by its last member in input order, and the
/// representatives are returned in input order.
pub struct MergeVertices {
    vertices: Vec<VertexId>,
    epsilon: f64,
}

impl MergeVertices {
    /// Creates a new `MergeVertices` query.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>, epsilon: f64) -> Self {
        Self { vertices, epsilon }
    }

    /// Executes the query, returning the surviving vertices.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] for a negative or NaN
    /// `epsilon`, or an error if a vertex does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<VertexId>> {
        let map = self.representatives(store)?;
        let mut out: Vec<VertexId> = Vec::new();
        for &v in &self.vertices {
            if map.get(&v) == Some(&v) && !out.contains(&v) {
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Maps every input vertex to the representative of its group.
    pub(crate) fn representatives(&self, store: &TopologyStore) -> Result<HashMap<VertexId, VertexId>> {
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(OperationError::InvalidArgument(format!(
                "merge epsilon must be non-negative, got {}",
                self.epsilon
            ))
            .into());
        }
        let mut unique: Vec<VertexId> = Vec::with_capacity(self.vertices.len());
        let mut index: HashMap<VertexId, usize> = HashMap::new();
        for &v in &self.vertices {
            if let std::collections::hash_map::Entry::Vacant(e) = index.entry(v) {
                e.insert(unique.len());
                unique.push(v);
            }
        }
        let points = unique
            .iter()
            .map(|&v| store.point(v))
            .collect::<Result<Vec<_>>>()?;

        let mut groups = UnionFind::new(points.len());
        let eps2 = self.epsilon * self.epsilon;
        let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            let cell = cell_of(p, self.epsilon);
            for neighbor in neighbor_cells(cell, self.epsilon > 0.0) {
                if let Some(members) = grid.get(&neighbor) {
                    for &j in members {
                        if (points[j] - p).norm_squared() <= eps2 {
                            groups.union(i, j);
                        }
                    }
                }
            }
            grid.entry(cell).or_default().push(i);
        }

        // The last member of each group represents it.
        let mut last: HashMap<usize, usize> = HashMap::new();
        for i in 0..points.len() {
            last.insert(groups.find(i), i);
        }
        let mut map = HashMap::with_capacity(unique.len());
        for (i, &v) in unique.iter().enumerate() {
            let root = groups.find(i);
            map.insert(v, unique[last[&root]]);
        }
        Ok(map)
    }
}

/// Grid cell of side `epsilon`; with a zero epsilon the cell is the exact
/// coordinate bit pattern so only coincident points meet.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn cell_of(p: &Point3, epsilon: f64) -> [i64; 3] {
    if epsilon > 0.0 {
        [0, 1, 2].map(|k| (p[k] / epsilon).floor() as i64)
    } else {
        [0, 1, 2].map(|k| (p[k] + 0.0).to_bits() as i64)
    }
}

pub(crate) fn neighbor_cells(cell: [i64; 3], spread: bool) -> Vec<[i64; 3]> {
    if !spread {
        return vec![cell];
    }
    let mut out = Vec::with_capacity(27);
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                out.push([
                    cell[0].saturating_add(dx),
                    cell[1].saturating_add(dy),
                    cell[2].saturating_add(dz),
                ]);
            }
        }
    }
    out
}

/// Disjoint sets over `0..n` with path halving.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn line(store: &mut TopologyStore) -> Vec<VertexId> {
        [0.0, 0.1, 10.0, 100.0]
            .into_iter()
            .map(|x| store.add_vertex(p(x, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn merge_keeps_last_of_each_group() {
        let mut store = TopologyStore::new();
        let v = line(&mut store);
        let kept = MergeVertices::new(v.clone(), 0.2).execute(&store).unwrap();
        assert_eq!(kept, vec![v[1], v[2], v[3]]);
        let kept = MergeVertices::new(v.clone(), 100.0).execute(&store).unwrap();
        assert_eq!(kept, vec![v[3]]);
        // The store is untouched.
        assert_eq!(store.vertex_count(), 4);
    }

    #[test]
    fn zero_epsilon_merges_coincident_points_only() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(p(1.0, 2.0, 3.0));
        let b = store.add_vertex(p(1.0, 2.0, 3.0));
        let c = store.add_vertex(p(1.0, 2.0, 3.0 + 1e-12));
        let kept = MergeVertices::new(vec![a, b, c], 0.0).execute(&store).unwrap();
        assert_eq!(kept, vec![b, c]);
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let mut store = TopologyStore::new();
        let v = line(&mut store);
        let err = MergeVertices::new(v, -1.0).execute(&store).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
