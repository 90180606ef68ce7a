//! Scalar field sampled on a regular grid.

use crate::error::{OperationError, Result};
use crate::math::{Aabb, Point3};

/// Scalar values on the nodes of a regular axis-aligned grid.
///
/// Values are stored with `z` varying fastest, then `y`, then `x`: the
/// value at node `(i, j, k)` is at `(i * ny + j) * nz + k`. Node `(0, 0, 0)`
/// sits on the minimum corner of the bounds and node
/// `(nx - 1, ny - 1, nz - 1)` on the maximum corner.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    values: Vec<f64>,
    dimensions: [usize; 3],
    bounds: Aabb,
}

impl ScalarGrid {
    /// Wraps sampled values.
    ///
    /// `extents` is `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if a dimension is below
    /// 2, the value count does not match the dimensions, or the extents
    /// are empty or not finite.
    pub fn new(dimensions: [usize; 3], values: Vec<f64>, extents: [f64; 6]) -> Result<Self> {
        if dimensions.iter().any(|&n| n < 2) {
            return Err(OperationError::InvalidArgument(format!(
                "grid needs at least 2 nodes per axis, got {dimensions:?}"
            ))
            .into());
        }
        let expected = dimensions
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .ok_or_else(|| OperationError::InvalidArgument(format!("grid dimensions {dimensions:?} overflow")))?;
        if values.len() != expected {
            return Err(OperationError::InvalidArgument(format!(
                "expected {expected} grid values, got {}",
                values.len()
            ))
            .into());
        }
        let [x0, x1, y0, y1, z0, z1] = extents;
        if extents.iter().any(|e| !e.is_finite()) || x0 >= x1 || y0 >= y1 || z0 >= z1 {
            return Err(OperationError::InvalidArgument(format!("invalid grid extents {extents:?}")).into());
        }
        Ok(Self {
            values,
            dimensions,
            bounds: Aabb {
                min: Point3::new(x0, y0, z0),
                max: Point3::new(x1, y1, z1),
            },
        })
    }

    /// Samples `f` at every node.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ScalarGrid::new`].
    pub fn from_fn(dimensions: [usize; 3], extents: [f64; 6], f: impl Fn(&Point3) -> f64) -> Result<Self> {
        let count = dimensions
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .ok_or_else(|| OperationError::InvalidArgument(format!("grid dimensions {dimensions:?} overflow")))?;
        let mut grid = Self::new(dimensions, vec![0.0; count], extents)?;
        let [nx, ny, nz] = dimensions;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let p = grid.position(i, j, k);
                    grid.values[(i * ny + j) * nz + k] = f(&p);
                }
            }
        }
        Ok(grid)
    }

    /// Number of nodes along each axis.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Box spanned by the grid nodes.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Linear index of node `(i, j, k)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [_, ny, nz] = self.dimensions;
        (i * ny + j) * nz + k
    }

    /// Value at node `(i, j, k)`.
    #[must_use]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[self.index(i, j, k)]
    }

    /// Position of node `(i, j, k)`.
    #[must_use]
    pub fn position(&self, i: usize, j: usize, k: usize) -> Point3 {
        let lerp = |axis: usize, n: usize| {
            #[allow(clippy::cast_precision_loss)]
            let t = n as f64 / (self.dimensions[axis] - 1) as f64;
            self.bounds.min[axis] + (self.bounds.max[axis] - self.bounds.min[axis]) * t
        };
        Point3::new(lerp(0, i), lerp(1, j), lerp(2, k))
    }
}
