//! Bounding volume hierarchy over indexed boxes.
//!
//! Used to prune triangle pairs in the boolean engine and nearest-face
//! searches in surface distance queries.

use super::{Aabb, Point3};

#[derive(Debug)]
enum Node {
    Leaf { bbox: Aabb, items: Vec<usize> },
    Internal { bbox: Aabb, left: Box<Node>, right: Box<Node> },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Hierarchy of axis-aligned boxes, each tagged by its index in the
/// slice it was built from.
#[derive(Debug)]
pub struct Bvh {
    root: Option<Node>,
    len: usize,
}

impl Bvh {
    /// Builds the hierarchy, splitting at the median along the longest axis
    /// until at most `max_leaf_size` boxes remain per leaf.
    #[must_use]
    pub fn build(boxes: &[Aabb], max_leaf_size: usize) -> Self {
        if boxes.is_empty() {
            return Self { root: None, len: 0 };
        }
        let indices: Vec<usize> = (0..boxes.len()).collect();
        Self {
            root: Some(Self::build_recursive(boxes, indices, max_leaf_size.max(1))),
            len: boxes.len(),
        }
    }

    fn build_recursive(boxes: &[Aabb], mut indices: Vec<usize>, max_leaf_size: usize) -> Node {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.include(&boxes[i].min);
            bbox.include(&boxes[i].max);
        }
        if indices.len() <= max_leaf_size {
            return Node::Leaf { bbox, items: indices };
        }

        let extent = bbox.max - bbox.min;
        let axis = extent.imax();
        indices.sort_by(|&a, &b| boxes[a].center()[axis].total_cmp(&boxes[b].center()[axis]));
        let right = indices.split_off(indices.len() / 2);
        Node::Internal {
            bbox,
            left: Box::new(Self::build_recursive(boxes, indices, max_leaf_size)),
            right: Box::new(Self::build_recursive(boxes, right, max_leaf_size)),
        }
    }

    /// Number of boxes in the hierarchy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the hierarchy holds no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the leaf boxes overlapping `query`.
    ///
    /// Leaf boxes are only tested through their node bounds, so callers
    /// should refine the candidates with an exact test.
    #[must_use]
    pub fn overlapping(&self, query: &Aabb, boxes: &[Aabb]) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = &self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !node.bbox().overlaps(query) {
                continue;
            }
            match node {
                Node::Leaf { items, .. } => {
                    out.extend(items.iter().copied().filter(|&i| boxes[i].overlaps(query)));
                }
                Node::Internal { left, right, .. } => {
                    stack.push(left.as_ref());
                    stack.push(right.as_ref());
                }
            }
        }
        out
    }

    /// Finds the item minimizing `distance2(index)` from `p`, where
    /// `distance2` is the exact squared distance to the item. Subtrees
    /// whose box is farther than the best hit are skipped.
    pub fn nearest(&self, p: &Point3, mut distance2: impl FnMut(usize) -> f64) -> Option<(usize, f64)> {
        let root = self.root.as_ref()?;
        let mut best: Option<(usize, f64)> = None;
        let mut stack = vec![(root.bbox().distance2(p), root)];
        while let Some((d, node)) = stack.pop() {
            if best.is_some_and(|(_, b)| d > b) {
                continue;
            }
            match node {
                Node::Leaf { items, .. } => {
                    for &i in items {
                        let di = distance2(i);
                        if best.is_none_or(|(_, b)| di < b) {
                            best = Some((i, di));
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    let dl = left.bbox().distance2(p);
                    let dr = right.bbox().distance2(p);
                    // Nearer child on top of the stack.
                    if dl < dr {
                        stack.push((dr, right.as_ref()));
                        stack.push((dl, left.as_ref()));
                    } else {
                        stack.push((dl, left.as_ref()));
                        stack.push((dr, right.as_ref()));
                    }
                }
            }
        }
        best
    }
}
