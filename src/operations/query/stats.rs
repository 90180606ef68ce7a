use std::collections::HashMap;

use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore};

/// Running summary of a sample of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Smallest value seen.
    pub min: f64,
    /// Largest value seen.
    pub max: f64,
    /// Sum of the values.
    pub sum: f64,
    /// Sum of the squared values.
    pub sum2: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// Number of values.
    pub n: usize,
}

impl Default for Range {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            sum2: 0.0,
            mean: 0.0,
            stddev: 0.0,
            n: 0,
        }
    }
}

impl Range {
    /// Adds a value; call [`update`](Self::update) to refresh the mean and
    /// standard deviation.
    pub fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.sum2 += value * value;
        self.n += 1;
    }

    /// Recomputes `mean` and `stddev` from the sums.
    pub fn update(&mut self) {
        if self.n == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.n as f64;
        self.mean = self.sum / n;
        self.stddev = (self.sum2 / n - self.mean * self.mean).max(0.0).sqrt();
    }

    /// Builds a finished range from an iterator of values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut range = Self::default();
        for v in values {
            range.add(v);
        }
        range.update();
        range
    }
}

/// Topological statistics of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceStatistics {
    /// Number of faces.
    pub n_faces: usize,
    /// Faces incompatible with at least one neighbor.
    pub n_incompatible_faces: usize,
    /// Edges bounding exactly one face.
    pub n_boundary_edges: usize,
    /// Edges bounding more than two faces.
    pub n_non_manifold_edges: usize,
    /// Number of surface edges at each surface vertex.
    pub edges_per_vertex: Range,
    /// Number of surface faces at each surface edge.
    pub faces_per_edge: Range,
}

/// Geometric quality statistics of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityStatistics {
    /// Face quality (1 for equilateral).
    pub face_quality: Range,
    /// Face area.
    pub face_area: Range,
    /// Edge length.
    pub edge_length: Range,
    /// Angle between the two faces of every manifold edge.
    pub edge_angle: Range,
}

/// Computes [`SurfaceStatistics`].
pub struct SurfaceStats {
    surface: SurfaceId,
}

impl SurfaceStats {
    /// Creates a new `SurfaceStats` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<SurfaceStatistics> {
        let s = self.surface;
        let faces = store.surface_faces(s)?;
        let edges = store.surface_edges(s)?;

        let mut n_incompatible_faces = 0;
        for &f in faces {
            if !store.is_face_compatible(f, s)? {
                n_incompatible_faces += 1;
            }
        }

        let mut faces_per_edge = Range::default();
        let mut n_boundary_edges = 0;
        let mut n_non_manifold_edges = 0;
        let mut edges_at: HashMap<_, usize> = HashMap::new();
        for &e in &edges {
            let n = store.face_number(e, s)?;
            #[allow(clippy::cast_precision_loss)]
            let count = n as f64;
            faces_per_edge.add(count);
            match n {
                1 => n_boundary_edges += 1,
                0 | 2 => {}
                _ => n_non_manifold_edges += 1,
            }
            let seg = store.segment(e)?;
            *edges_at.entry(seg.v1).or_insert(0) += 1;
            *edges_at.entry(seg.v2).or_insert(0) += 1;
        }
        faces_per_edge.update();
        #[allow(clippy::cast_precision_loss)]
        let edges_per_vertex = Range::from_values(edges_at.values().map(|&n| n as f64));

        Ok(SurfaceStatistics {
            n_faces: faces.len(),
            n_incompatible_faces,
            n_boundary_edges,
            n_non_manifold_edges,
            edges_per_vertex,
            faces_per_edge,
        })
    }
}

/// Computes [`QualityStatistics`].
pub struct QualityStats {
    surface: SurfaceId,
}

impl QualityStats {
    /// Creates a new `QualityStats` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<QualityStatistics> {
        let s = self.surface;
        let mut face_quality = Range::default();
        let mut face_area = Range::default();
        for &f in store.surface_faces(s)? {
            face_quality.add(store.triangle_quality(f)?);
            face_area.add(store.triangle_area(f)?);
        }
        let mut edge_length = Range::default();
        let mut edge_angle = Range::default();
        for e in store.surface_edges(s)? {
            edge_length.add(store.segment_length(e)?);
            if let Some((f1, f2)) = store.manifold_faces(s, e)? {
                edge_angle.add(store.triangles_angle(f1, f2)?);
            }
        }
        for r in [&mut face_quality, &mut face_area, &mut edge_length, &mut edge_angle] {
            r.update();
        }
        Ok(QualityStatistics {
            face_quality,
            face_area,
            edge_length,
            edge_angle,
        })
    }
}
