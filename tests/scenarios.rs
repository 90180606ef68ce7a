//! End-to-end scenarios across topology, queries, booleans, isosurfaces
//! and the text format.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use trisurf::io::{read_gts, write_gts};
use trisurf::isosurface::{IsoMethod, Isosurface, IsosurfaceParams, ScalarGrid};
use trisurf::math::{Point3, Vector3};
use trisurf::operations::boolean::Intersection;
use trisurf::operations::creation::{MakeCube, MakeSphere, MakeTetrahedron};
use trisurf::operations::modification::{MergeVertices, Split};
use trisurf::operations::query::{Area, SurfaceStats, Volume};
use trisurf::operations::transform::Translate;
use trisurf::topology::{TopologyStore, TriangleInput};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn segments_are_deduplicated() {
    let mut store = TopologyStore::new();
    let a = store.add_vertex(p(0.0, 0.0, 0.0));
    let b = store.add_vertex(p(1.0, 0.0, 0.0));
    let e1 = store.add_edge(a, b).unwrap();
    let e2 = store.add_edge(b, a).unwrap();
    assert_eq!(e1, e2);
    assert_eq!(store.segment_count(), 1);
    assert!(store.add_edge(a, a).unwrap_err().is_degenerate());
}

#[test]
fn tetrahedron_measures() {
    let mut store = TopologyStore::new();
    let v = [p(1.0, 1.0, 1.0), p(-1.0, -1.0, 1.0), p(-1.0, 1.0, -1.0), p(1.0, -1.0, -1.0)]
        .map(|q| store.add_vertex(q));
    let s = store.add_surface();
    for tri in [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]] {
        let f = store.add_face(TriangleInput::Vertices(tri.map(|i| v[i]))).unwrap();
        store.surface_add(s, f).unwrap();
        store.release_triangle(f).unwrap();
    }
    assert!(store.is_closed(s).unwrap());
    assert_relative_eq!(Area::new(s).execute(&store).unwrap(), 8.0 * 3.0_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(Volume::new(s).execute(&store).unwrap().abs(), 8.0 / 3.0, epsilon = 1e-12);

    let built = MakeTetrahedron::new().execute(&mut store).unwrap();
    assert_relative_eq!(Volume::new(built).execute(&store).unwrap(), 8.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn closed_means_two_faces_per_edge() {
    let mut store = TopologyStore::new();
    let cube = MakeCube::new().execute(&mut store).unwrap();
    assert!(store.is_closed(cube).unwrap());
    let stats = SurfaceStats::new(cube).execute(&store).unwrap();
    assert_relative_eq!(stats.faces_per_edge.min, 2.0);
    assert_relative_eq!(stats.faces_per_edge.max, 2.0);

    let f = store.surface_faces(cube).unwrap()[0];
    store.surface_remove(cube, f).unwrap();
    assert!(!store.is_closed(cube).unwrap());
    assert_eq!(SurfaceStats::new(cube).execute(&store).unwrap().n_boundary_edges, 3);
}

#[test]
fn reverting_one_face_breaks_orientation_only() {
    let mut store = TopologyStore::new();
    let sphere = MakeSphere::new(1).execute(&mut store).unwrap();
    assert!(store.is_orientable(sphere).unwrap());
    let f = store.surface_faces(sphere).unwrap()[3];
    store.revert(f).unwrap();
    assert!(!store.is_orientable(sphere).unwrap());
    assert!(store.is_closed(sphere).unwrap());
}

#[test]
fn split_partitions_the_faces() {
    let mut store = TopologyStore::new();
    let a = MakeTetrahedron::new().execute(&mut store).unwrap();
    let b = MakeCube::new().execute(&mut store).unwrap();
    Translate::new(b, Vector3::new(5.0, 0.0, 0.0)).execute(&mut store).unwrap();
    store.surface_merge(a, b).unwrap();
    assert_eq!(store.face_count(a).unwrap(), 16);

    let parts = Split::new(a).execute(&mut store).unwrap();
    assert_eq!(parts.len(), 2);
    let counts: Vec<usize> = parts.iter().map(|&s| store.face_count(s).unwrap()).collect();
    assert_eq!(counts.iter().sum::<usize>(), 16);
    assert!(counts.contains(&4) && counts.contains(&12));
    for s in parts {
        assert!(store.is_closed(s).unwrap());
    }
}

#[test]
fn merge_thresholds() {
    let mut store = TopologyStore::new();
    let v: Vec<_> = [0.0, 0.1, 10.0, 100.0]
        .into_iter()
        .map(|x| store.add_vertex(p(x, 0.0, 0.0)))
        .collect();
    assert_eq!(MergeVertices::new(v.clone(), 0.2).execute(&store).unwrap().len(), 3);
    assert_eq!(MergeVertices::new(v, 100.0).execute(&store).unwrap().len(), 1);
}

#[test]
fn gts_round_trip_keeps_faces() {
    let mut store = TopologyStore::new();
    let sphere = MakeSphere::new(2).execute(&mut store).unwrap();
    let mut text = Vec::new();
    write_gts(&store, sphere, &mut text).unwrap();

    let mut other = TopologyStore::new();
    let back = read_gts(&mut other, text.as_slice()).unwrap();
    assert_eq!(other.face_count(back).unwrap(), 320);
    assert!(other.is_closed(back).unwrap());
    assert!(other.is_orientable(back).unwrap());
    assert_relative_eq!(
        Volume::new(back).execute(&other).unwrap(),
        Volume::new(sphere).execute(&store).unwrap(),
        max_relative = 1e-12
    );
}

#[test]
fn cube_intersection_volume() {
    init_tracing();
    let mut store = TopologyStore::new();
    let a = MakeCube::new()
        .with_corners(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
        .execute(&mut store)
        .unwrap();
    let b = MakeCube::new()
        .with_corners(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
        .execute(&mut store)
        .unwrap();
    Translate::new(b, Vector3::new(0.5, 0.5, 0.5)).execute(&mut store).unwrap();

    let c = Intersection::new(a, b).execute(&mut store).unwrap();
    assert!(store.is_closed(c).unwrap());
    assert!(store.is_manifold(c).unwrap());
    assert_relative_eq!(Volume::new(c).execute(&store).unwrap(), 0.125, epsilon = 1e-9);
    assert!(store.is_ok());
}

#[test]
fn sphere_isosurface() {
    init_tracing();
    let grid = ScalarGrid::from_fn([50, 50, 50], [-5.0, 5.0, -5.0, 5.0, -5.0, 5.0], |q| {
        q.coords.norm_squared()
    })
    .unwrap();
    let mut store = TopologyStore::new();
    let s = Isosurface::new(&grid)
        .with_params(IsosurfaceParams::default().with_method(IsoMethod::Tetra).with_isovalue(9.0))
        .execute(&mut store)
        .unwrap();
    assert!(store.is_closed(s).unwrap());
    assert!(store.is_manifold(s).unwrap());
    let pi = std::f64::consts::PI;
    assert_relative_eq!(Area::new(s).execute(&store).unwrap(), 36.0 * pi, max_relative = 0.01);
    assert_relative_eq!(Volume::new(s).execute(&store).unwrap(), 36.0 * pi, max_relative = 0.01);
}
