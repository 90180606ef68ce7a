//! Isosurface extraction from scalar fields sampled on regular grids.
//!
//! The region where the field is below the isovalue counts as inside, so
//! face normals point toward increasing field values.

mod cubes;
mod dual;
mod grid;
mod tetra;

pub use grid::ScalarGrid;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore, VertexId};

/// Extraction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsoMethod {
    /// Marching cubes, one polygon loop per sign pattern of a cube.
    #[default]
    Cubes,
    /// Marching tetrahedra over a six-tetrahedron split of every cube.
    Tetra,
    /// Dual contouring: one vertex per crossed cube, one quad per crossed
    /// grid edge. Edges on the grid boundary emit nothing.
    Dual,
    /// Marching tetrahedra with the domain treated as surrounded by
    /// outside values, so the surface is closed along the grid boundary.
    Bounded,
}

/// Parameters of an isosurface extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct IsosurfaceParams {
    /// Extraction algorithm.
    pub method: IsoMethod,
    /// Levels extracted into the same surface.
    pub isovalues: Vec<f64>,
}

impl Default for IsosurfaceParams {
    fn default() -> Self {
        Self {
            method: IsoMethod::Cubes,
            isovalues: vec![0.0],
        }
    }
}

impl IsosurfaceParams {
    /// Sets the extraction algorithm.
    #[must_use]
    pub fn with_method(mut self, method: IsoMethod) -> Self {
        self.method = method;
        self
    }

    /// Extracts the single level `isovalue`.
    #[must_use]
    pub fn with_isovalue(mut self, isovalue: f64) -> Self {
        self.isovalues = vec![isovalue];
        self
    }

    /// Extracts every level in `isovalues` into one surface.
    #[must_use]
    pub fn with_isovalues(mut self, isovalues: impl Into<Vec<f64>>) -> Self {
        self.isovalues = isovalues.into();
        self
    }
}

/// Builds the surface `{f = isovalue}` of a sampled field.
pub struct Isosurface<'a> {
    grid: &'a ScalarGrid,
    params: IsosurfaceParams,
}

impl<'a> Isosurface<'a> {
    /// Creates a new `Isosurface` operation with default parameters.
    #[must_use]
    pub fn new(grid: &'a ScalarGrid) -> Self {
        Self {
            grid,
            params: IsosurfaceParams::default(),
        }
    }

    /// Replaces the parameters.
    #[must_use]
    pub fn with_params(mut self, params: IsosurfaceParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the extraction into a new surface held by one handle.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if no isovalue is given
    /// or one is not finite.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        let levels = &self.params.isovalues;
        if levels.is_empty() {
            return Err(OperationError::InvalidArgument("no isovalue given".into()).into());
        }
        if let Some(bad) = levels.iter().find(|v| !v.is_finite()) {
            return Err(OperationError::InvalidArgument(format!("isovalue must be finite, got {bad}")).into());
        }

        let surface = store.add_surface();
        let mut mesh = MeshSink::new(store, surface);
        for (level, &iso) in levels.iter().enumerate() {
            let before = mesh.faces;
            let run = match self.params.method {
                IsoMethod::Cubes => cubes::extract(self.grid, iso, level, &mut mesh),
                IsoMethod::Tetra => tetra::extract(self.grid, iso, level, false, &mut mesh),
                IsoMethod::Bounded => tetra::extract(self.grid, iso, level, true, &mut mesh),
                IsoMethod::Dual => dual::extract(self.grid, iso, level, &mut mesh),
            };
            if let Err(e) = run {
                mesh.discard()?;
                return Err(e);
            }
            debug!(iso, faces = mesh.faces - before, "level extracted");
        }
        info!(
            method = ?self.params.method,
            dims = ?self.grid.dimensions(),
            levels = levels.len(),
            vertices = mesh.vertices.len(),
            faces = mesh.faces,
            "isosurface extracted"
        );
        Ok(surface)
    }
}

/// Identifies an output vertex: the level plus two lattice locations (the
/// ends of a crossed edge, or a cube twice for dual vertices).
pub(crate) type VertexKey = (usize, usize, usize);

/// Receives the triangles of an extraction and shares vertices by key.
pub(crate) struct MeshSink<'s> {
    store: &'s mut TopologyStore,
    surface: SurfaceId,
    vertices: HashMap<VertexKey, VertexId>,
    faces: usize,
}

impl<'s> MeshSink<'s> {
    fn new(store: &'s mut TopologyStore, surface: SurfaceId) -> Self {
        Self {
            store,
            surface,
            vertices: HashMap::new(),
            faces: 0,
        }
    }

    /// Returns the vertex for `key`, creating it at `at()` on first use.
    pub(crate) fn vertex(&mut self, key: VertexKey, at: impl FnOnce() -> Point3) -> VertexId {
        let store = &mut *self.store;
        *self.vertices.entry(key).or_insert_with(|| store.new_vertex(at()))
    }

    /// Adds the face `a b c` to the surface. Triangles repeating a vertex
    /// are dropped.
    pub(crate) fn triangle(&mut self, [a, b, c]: [VertexId; 3]) -> Result<()> {
        if a == b || b == c || c == a {
            return Ok(());
        }
        let face = self.store.new_face([a, b, c])?;
        if self.store.surface_add(self.surface, face)? {
            self.faces += 1;
        }
        Ok(())
    }

    fn discard(self) -> Result<()> {
        self.store.release_surface(self.surface)?;
        for v in self.vertices.into_values() {
            self.store.collect_vertex(v);
        }
        Ok(())
    }
}

/// Point where the field crosses `iso` between `pa` (value `va`) and `pb`.
pub(crate) fn crossing(pa: &Point3, va: f64, pb: &Point3, vb: f64, iso: f64) -> Point3 {
    if va.is_infinite() {
        return *pb;
    }
    if vb.is_infinite() {
        return *pa;
    }
    let dv = vb - va;
    let t = if dv == 0.0 { 0.5 } else { ((iso - va) / dv).clamp(0.0, 1.0) };
    pa + (pb - pa) * t
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::{Area, Volume};
    use approx::assert_relative_eq;

    const RADIUS: f64 = 3.0;

    fn sphere_grid(n: usize) -> ScalarGrid {
        ScalarGrid::from_fn([n, n, n], [-5.0, 5.0, -5.0, 5.0, -5.0, 5.0], |p| {
            p.coords.norm_squared()
        })
        .unwrap()
    }

    fn check_sphere(method: IsoMethod) {
        let grid = sphere_grid(50);
        let mut store = TopologyStore::new();
        let s = Isosurface::new(&grid)
            .with_params(IsosurfaceParams::default().with_method(method).with_isovalue(RADIUS * RADIUS))
            .execute(&mut store)
            .unwrap();
        assert!(store.is_closed(s).unwrap(), "{method:?} not closed");
        assert!(store.is_manifold(s).unwrap(), "{method:?} not manifold");
        assert!(store.is_orientable(s).unwrap(), "{method:?} not oriented");

        let area = Area::new(s).execute(&store).unwrap();
        let volume = Volume::new(s).execute(&store).unwrap();
        let pi = std::f64::consts::PI;
        assert_relative_eq!(area, 4.0 * pi * RADIUS * RADIUS, max_relative = 0.01);
        assert_relative_eq!(volume, 4.0 / 3.0 * pi * RADIUS.powi(3), max_relative = 0.01);
        for v in store.surface_vertices(s).unwrap() {
            let r = store.point(v).unwrap().coords.norm();
            assert_relative_eq!(r, RADIUS, max_relative = 0.01);
        }
    }

    #[test]
    fn sphere_by_cubes() {
        check_sphere(IsoMethod::Cubes);
    }

    #[test]
    fn sphere_by_tetrahedra() {
        check_sphere(IsoMethod::Tetra);
    }

    #[test]
    fn sphere_by_dual_contouring() {
        check_sphere(IsoMethod::Dual);
    }

    #[test]
    fn bounded_extraction_closes_the_domain() {
        let grid = ScalarGrid::from_fn([11, 11, 11], [-5.0, 5.0, -5.0, 5.0, -5.0, 5.0], |p| p.z).unwrap();
        let mut store = TopologyStore::new();

        let open = Isosurface::new(&grid).execute(&mut store).unwrap();
        assert!(!store.is_closed(open).unwrap());
        assert_relative_eq!(Area::new(open).execute(&store).unwrap(), 100.0, epsilon = 1e-9);

        let s = Isosurface::new(&grid)
            .with_params(IsosurfaceParams::default().with_method(IsoMethod::Bounded))
            .execute(&mut store)
            .unwrap();
        assert!(store.is_closed(s).unwrap());
        assert!(store.is_orientable(s).unwrap());
        assert_relative_eq!(Volume::new(s).execute(&store).unwrap(), 500.0, epsilon = 1e-6);
    }

    #[test]
    fn levels_are_unioned() {
        let grid = sphere_grid(30);
        let mut store = TopologyStore::new();
        let one = |store: &mut TopologyStore, levels: Vec<f64>| {
            let s = Isosurface::new(&grid)
                .with_params(IsosurfaceParams::default().with_isovalues(levels))
                .execute(store)
                .unwrap();
            store.face_count(s).unwrap()
        };
        let inner = one(&mut store, vec![4.0]);
        let outer = one(&mut store, vec![9.0]);
        let both = one(&mut store, vec![4.0, 9.0]);
        assert_eq!(both, inner + outer);
        assert!(store.is_ok());
    }

    #[test]
    fn level_outside_the_field_is_empty() {
        let grid = sphere_grid(10);
        let mut store = TopologyStore::new();
        let s = Isosurface::new(&grid)
            .with_params(IsosurfaceParams::default().with_isovalue(-1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face_count(s).unwrap(), 0);
        assert_eq!(store.vertex_count(), 0);
    }

    #[test]
    fn missing_isovalue_is_rejected() {
        let grid = sphere_grid(4);
        let mut store = TopologyStore::new();
        let err = Isosurface::new(&grid)
            .with_params(IsosurfaceParams::default().with_isovalues(Vec::<f64>::new()))
            .execute(&mut store)
            .unwrap_err();
        assert!(err.is_invalid_argument());
        let err = Isosurface::new(&grid)
            .with_params(IsosurfaceParams::default().with_isovalue(f64::NAN))
            .execute(&mut store)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
