//! Persisted mesh formats and indexed exports.

mod gts;

pub use gts::{load_gts, read_gts, save_gts, write_gts};

use crate::error::Result;
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore};

/// Flat copy of a surface: vertex coordinates and per-face vertex index
/// triples, in face orientation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedMesh {
    /// Vertex coordinates.
    pub positions: Vec<Point3>,
    /// Zero-based indices into `positions`, one triple per face.
    pub faces: Vec<[usize; 3]>,
}

/// Exports a surface as an [`IndexedMesh`].
///
/// # Errors
///
/// Returns an error if the surface does not exist.
pub fn export_indexed(store: &TopologyStore, surface: SurfaceId) -> Result<IndexedMesh> {
    let vertices = store.surface_vertices(surface)?;
    let positions = vertices
        .iter()
        .map(|&v| store.point(v))
        .collect::<Result<Vec<_>>>()?;
    let faces = store.face_indices(surface, &vertices)?;
    Ok(IndexedMesh { positions, faces })
}
