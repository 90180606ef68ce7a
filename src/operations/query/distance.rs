use crate::error::{OperationError, Result};
use crate::math::distance_3d::{point_segment_distance2, point_triangle_distance2};
use crate::math::{Aabb, Bvh, Point3};
use crate::topology::{SurfaceId, TopologyStore};

use super::boundary::Boundary;
use super::stats::Range;

const LEAF_SIZE: usize = 8;

/// Distance statistics from one surface to another.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDistanceResult {
    /// Distances from points sampled on the faces of the first surface to
    /// the faces of the second.
    pub faces: Range,
    /// Distances from points sampled on the boundary of the first surface
    /// to the boundary of the second; `None` unless both have a boundary.
    pub boundary: Option<Range>,
}

/// Samples the distance from a surface to a reference surface.
///
/// Every face of `from` is sampled on a regular barycentric grid whose
/// spacing is `delta` times the bounding box diagonal of `to`; vertices are
/// always sampled. Each sample contributes its distance to the nearest face
/// of `to`.
pub struct SurfaceDistance {
    from: SurfaceId,
    to: SurfaceId,
    delta: f64,
}

impl SurfaceDistance {
    /// Creates a new `SurfaceDistance` query with a sampling step of 0.1.
    #[must_use]
    pub fn new(from: SurfaceId, to: SurfaceId) -> Self {
        Self { from, to, delta: 0.1 }
    }

    /// Sets the sampling step, as a fraction of the reference diagonal.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if `delta` is not
    /// positive or the reference surface has no faces.
    pub fn execute(&self, store: &TopologyStore) -> Result<SurfaceDistanceResult> {
        if self.delta.is_nan() || self.delta <= 0.0 {
            return Err(OperationError::InvalidArgument(format!("delta must be positive, got {}", self.delta)).into());
        }
        let targets = store
            .surface_faces(self.to)?
            .iter()
            .map(|&f| store.triangle_points(f))
            .collect::<Result<Vec<_>>>()?;
        if targets.is_empty() {
            return Err(OperationError::InvalidArgument("reference surface has no faces".into()).into());
        }
        let boxes: Vec<Aabb> = targets.iter().map(|t| Aabb::from_points(t)).collect();
        let extent = Aabb::from_points(targets.iter().flatten()).diagonal();
        let step = (self.delta * extent).max(f64::MIN_POSITIVE);
        let bvh = Bvh::build(&boxes, LEAF_SIZE);

        let mut faces = Range::default();
        for &f in store.surface_faces(self.from)? {
            let [a, b, c] = store.triangle_points(f)?;
            let longest = (b - a).norm().max((c - b).norm()).max((a - c).norm());
            for q in triangle_samples(&a, &b, &c, subdivisions(longest, step)) {
                if let Some((_, d2)) = bvh.nearest(&q, |i| {
                    let [ta, tb, tc] = &targets[i];
                    point_triangle_distance2(&q, ta, tb, tc)
                }) {
                    faces.add(d2.sqrt());
                }
            }
        }
        faces.update();

        let boundary = self.boundary_range(store, step)?;
        Ok(SurfaceDistanceResult { faces, boundary })
    }

    fn boundary_range(&self, store: &TopologyStore, step: f64) -> Result<Option<Range>> {
        let from_edges = Boundary::new(self.from).execute(store)?;
        let to_edges = Boundary::new(self.to).execute(store)?;
        if from_edges.is_empty() || to_edges.is_empty() {
            return Ok(None);
        }
        let targets = to_edges
            .iter()
            .map(|&e| store.segment_points(e))
            .collect::<Result<Vec<_>>>()?;
        let boxes: Vec<Aabb> = targets.iter().map(|s| Aabb::from_points(s)).collect();
        let bvh = Bvh::build(&boxes, LEAF_SIZE);

        let mut range = Range::default();
        for e in from_edges {
            let [a, b] = store.segment_points(e)?;
            let n = subdivisions((b - a).norm(), step);
            for i in 0..=n {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 / n as f64;
                let q = a + (b - a) * t;
                if let Some((_, d2)) = bvh.nearest(&q, |j| {
                    let [sa, sb] = &targets[j];
                    point_segment_distance2(&q, sa, sb)
                }) {
                    range.add(d2.sqrt());
                }
            }
        }
        range.update();
        Ok(Some(range))
    }
}

fn subdivisions(length: f64, step: f64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (length / step).ceil() as usize;
    n.max(1)
}

/// Points of the barycentric grid with `n` intervals per side.
fn triangle_samples(a: &Point3, b: &Point3, c: &Point3, n: usize) -> Vec<Point3> {
    let mut out = Vec::with_capacity((n + 1) * (n + 2) / 2);
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / n as f64;
    for i in 0..=n {
        for j in 0..=n - i {
            #[allow(clippy::cast_precision_loss)]
            let (u, v) = (i as f64 * inv, j as f64 * inv);
            out.push(a + (b - a) * u + (c - a) * v);
        }
    }
    out
}
