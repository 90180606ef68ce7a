mod make_cube;
mod make_sphere;
mod make_tetrahedron;

pub use make_cube::MakeCube;
pub use make_sphere::MakeSphere;
pub use make_tetrahedron::MakeTetrahedron;

use crate::error::Result;
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore, VertexId};

/// Adds the face `(a, b, c)` to `surface`, reversed if needed so that its
/// normal points away from `center`. Only meaningful for convex shapes
/// around `center`.
fn add_outward(
    store: &mut TopologyStore,
    surface: SurfaceId,
    [a, b, c]: [VertexId; 3],
    center: &Point3,
) -> Result<()> {
    let (pa, pb, pc) = (store.point(a)?, store.point(b)?, store.point(c)?);
    let normal = (pb - pa).cross(&(pc - pa));
    let centroid = Point3::from((pa.coords + pb.coords + pc.coords) / 3.0);
    let face = if normal.dot(&(centroid - center)) >= 0.0 {
        store.new_face([a, b, c])?
    } else {
        store.new_face([a, c, b])?
    };
    store.surface_add(surface, face)?;
    Ok(())
}
