use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::TOLERANCE;
use crate::operations::query::{Area, BoundingBox, CenterOfArea, IsSelfIntersecting, Volume};
use crate::topology::{SurfaceId, TopologyStore};

use super::assemble::assemble_result;
use super::classify::locate_pieces;
use super::face_intersection::{intersect_operands, Cuts, OperandMesh, PointTable};
use super::select::{should_keep_piece, BooleanOp, KeepDecision, Location, Operand};
use super::split::split_operand;
use super::BooleanParams;

/// Executes a boolean operation on two closed surfaces.
///
/// Pipeline: validation, face-face intersection with welding of the
/// intersection points, constrained retriangulation of the cut faces,
/// inside/outside classification, selection and assembly into a new
/// surface. The operands are not modified.
pub fn boolean_execute(
    store: &mut TopologyStore,
    first: SurfaceId,
    second: SurfaceId,
    op: BooleanOp,
    params: &BooleanParams,
) -> Result<SurfaceId> {
    validate_inputs(store, first, second, params)?;

    let mut bbox = BoundingBox::new(first).execute(store)?;
    let bbox_b = BoundingBox::new(second).execute(store)?;
    let disjoint = !bbox.overlaps(&bbox_b);
    bbox.include(&bbox_b.min);
    bbox.include(&bbox_b.max);
    let tolerance = (params.weld_tolerance * bbox.diagonal()).max(f64::MIN_POSITIVE);

    let mut index = HashMap::new();
    let mut table = PointTable::new(tolerance);
    let mesh_a = OperandMesh::load(store, first, Operand::First, &mut table, &mut index)?;
    let mesh_b = OperandMesh::load(store, second, Operand::Second, &mut table, &mut index)?;

    let cuts = if disjoint {
        Cuts::default()
    } else {
        intersect_operands(&mesh_a, &mesh_b, &mut table)?
    };
    debug!(
        points = table.len(),
        segments = cuts.segment_count(),
        tolerance,
        "intersection curve computed"
    );

    let mut cut_edges = HashSet::new();
    let mut pieces = split_operand(&mesh_a, &table, &cuts, &mut cut_edges)?;
    pieces.extend(split_operand(&mesh_b, &table, &cuts, &mut cut_edges)?);
    debug!(pieces = pieces.len(), cut_edges = cut_edges.len(), "faces split");

    let locations = if cuts.is_empty() && disjoint {
        vec![Location::Outside; pieces.len()]
    } else {
        locate_pieces(store, &table, &pieces, &cut_edges, &mesh_a.faces, &mesh_b.faces)?
    };

    // Inward-oriented operands are turned outward in the result.
    let inward_a = Volume::new(first).execute(store)? < 0.0;
    let inward_b = Volume::new(second).execute(store)? < 0.0;
    let mut kept = Vec::new();
    for (piece, &location) in pieces.iter().zip(&locations) {
        let flip = match should_keep_piece(piece.source, location, op) {
            KeepDecision::Discard => continue,
            KeepDecision::Keep => false,
            KeepDecision::KeepFlipped => true,
        };
        let inward = match piece.source {
            Operand::First => inward_a,
            Operand::Second => inward_b,
        };
        let [a, b, c] = piece.vertices;
        kept.push(if flip ^ inward { [a, c, b] } else { [a, b, c] });
    }
    debug!(kept = kept.len(), "pieces selected");

    let result = assemble_result(store, &table, &kept)?;
    if !store.is_closed(result)? || !store.is_manifold(result)? {
        store.release_surface(result)?;
        return Err(OperationError::MutualIntersection(
            "result is not a closed manifold, the operands touch along a degenerate contact".into(),
        )
        .into());
    }
    info!(?op, faces = store.face_count(result)?, "boolean operation complete");
    Ok(result)
}

fn validate_inputs(
    store: &TopologyStore,
    first: SurfaceId,
    second: SurfaceId,
    params: &BooleanParams,
) -> Result<()> {
    if first == second {
        return Err(OperationError::InvalidArgument("both operands are the same surface".into()).into());
    }
    if !params.weld_tolerance.is_finite() || params.weld_tolerance <= 0.0 {
        return Err(OperationError::InvalidArgument(format!(
            "weld tolerance must be positive, got {}",
            params.weld_tolerance
        ))
        .into());
    }
    for s in [first, second] {
        if !store.is_closed(s)? {
            return Err(TopologyError::NotClosed.into());
        }
        if !store.is_manifold(s)? {
            return Err(TopologyError::NotManifold.into());
        }
        if !store.is_orientable(s)? {
            return Err(TopologyError::NotOriented.into());
        }
        if params.check_self_intersection && IsSelfIntersecting::new(s).execute(store)? {
            return Err(OperationError::SelfIntersecting.into());
        }
    }
    if same_shape(store, first, second)? {
        return Err(OperationError::MutualIntersection("the operands are identical".into()).into());
    }
    Ok(())
}

/// Same counts, area and center of area.
fn same_shape(store: &TopologyStore, a: SurfaceId, b: SurfaceId) -> Result<bool> {
    if store.face_count(a)? != store.face_count(b)?
        || store.edge_count(a)? != store.edge_count(b)?
        || store.vertex_count_of(a)? != store.vertex_count_of(b)?
    {
        return Ok(false);
    }
    let (area_a, area_b) = (Area::new(a).execute(store)?, Area::new(b).execute(store)?);
    let scale = area_a.abs().max(area_b.abs()).max(1.0);
    if (area_a - area_b).abs() > TOLERANCE * scale {
        return Ok(false);
    }
    let ca = CenterOfArea::new(a).execute(store)?;
    let cb = CenterOfArea::new(b).execute(store)?;
    Ok((ca - cb).norm() <= TOLERANCE * scale.sqrt())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeCube, MakeSphere};
    use crate::operations::transform::Translate;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_cube(store: &mut TopologyStore, offset: f64) -> SurfaceId {
        MakeCube::new()
            .with_corners(p(offset, offset, offset), p(offset + 1.0, offset + 1.0, offset + 1.0))
            .execute(store)
            .unwrap()
    }

    fn run(store: &mut TopologyStore, a: SurfaceId, b: SurfaceId, op: BooleanOp) -> Result<SurfaceId> {
        boolean_execute(store, a, b, op, &BooleanParams::default())
    }

    #[test]
    fn overlapping_cubes() {
        let mut store = TopologyStore::new();
        let a = unit_cube(&mut store, 0.0);
        let b = unit_cube(&mut store, 0.5);

        for (op, expected) in [
            (BooleanOp::Intersection, 0.125),
            (BooleanOp::Union, 1.875),
            (BooleanOp::Difference, 0.875),
        ] {
            let s = run(&mut store, a, b, op).unwrap();
            assert!(store.is_closed(s).unwrap(), "{op:?}");
            assert!(store.is_manifold(s).unwrap(), "{op:?}");
            assert!(store.is_orientable(s).unwrap(), "{op:?}");
            assert_relative_eq!(Volume::new(s).execute(&store).unwrap(), expected, epsilon = 1e-9);
            store.release_surface(s).unwrap();
        }
        assert_eq!(store.face_count(a).unwrap(), 12);
        assert!(store.is_ok());
    }

    #[test]
    fn disjoint_cubes() {
        let mut store = TopologyStore::new();
        let a = unit_cube(&mut store, 0.0);
        let b = unit_cube(&mut store, 5.0);

        let union = run(&mut store, a, b, BooleanOp::Union).unwrap();
        assert_eq!(store.face_count(union).unwrap(), 24);
        assert_relative_eq!(Volume::new(union).execute(&store).unwrap(), 2.0, epsilon = 1e-12);

        let inter = run(&mut store, a, b, BooleanOp::Intersection).unwrap();
        assert_eq!(store.face_count(inter).unwrap(), 0);

        let diff = run(&mut store, a, b, BooleanOp::Difference).unwrap();
        assert_eq!(store.face_count(diff).unwrap(), 12);
        assert_relative_eq!(Volume::new(diff).execute(&store).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nested_cube_leaves_a_void() {
        let mut store = TopologyStore::new();
        let outer = MakeCube::new().execute(&mut store).unwrap();
        let inner = MakeCube::new()
            .with_corners(p(-0.5, -0.25, -0.5), p(0.5, 0.5, 0.25))
            .execute(&mut store)
            .unwrap();
        let diff = run(&mut store, outer, inner, BooleanOp::Difference).unwrap();
        assert_eq!(store.face_count(diff).unwrap(), 24);
        assert_relative_eq!(Volume::new(diff).execute(&store).unwrap(), 8.0 - 0.5625, epsilon = 1e-12);

        let union = run(&mut store, outer, inner, BooleanOp::Union).unwrap();
        assert_relative_eq!(Volume::new(union).execute(&store).unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn spheres_satisfy_inclusion_exclusion() {
        let mut store = TopologyStore::new();
        let a = MakeSphere::new(2).execute(&mut store).unwrap();
        let b = MakeSphere::new(2).execute(&mut store).unwrap();
        Translate::new(b, Vector3::new(0.7, 0.31, 0.13)).execute(&mut store).unwrap();

        let union = run(&mut store, a, b, BooleanOp::Union).unwrap();
        let inter = run(&mut store, a, b, BooleanOp::Intersection).unwrap();
        let diff = run(&mut store, a, b, BooleanOp::Difference).unwrap();
        let v = |s| Volume::new(s).execute(&store).unwrap();
        assert_relative_eq!(v(union) + v(inter), v(a) + v(b), epsilon = 1e-9);
        assert_relative_eq!(v(diff) + v(inter), v(a), epsilon = 1e-9);
    }

    #[test]
    fn rejected_operands() {
        let mut store = TopologyStore::new();
        let a = unit_cube(&mut store, 0.0);
        let twin = unit_cube(&mut store, 0.0);
        let err = run(&mut store, a, a, BooleanOp::Union).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = run(&mut store, a, twin, BooleanOp::Union).unwrap_err();
        assert!(err.is_mutual_intersection());

        let open = unit_cube(&mut store, 3.0);
        let face = store.surface_faces(open).unwrap()[0];
        store.surface_remove(open, face).unwrap();
        let err = run(&mut store, a, open, BooleanOp::Union).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TrisurfError::Topology(TopologyError::NotClosed)
        ));
    }

    #[test]
    fn inward_operand_is_turned_outward() {
        let mut store = TopologyStore::new();
        let a = unit_cube(&mut store, 0.0);
        let b = unit_cube(&mut store, 0.5);
        for f in store.surface_faces(b).unwrap().to_vec() {
            store.revert(f).unwrap();
        }
        let s = run(&mut store, a, b, BooleanOp::Intersection).unwrap();
        assert_relative_eq!(Volume::new(s).execute(&store).unwrap(), 0.125, epsilon = 1e-9);
    }
}
