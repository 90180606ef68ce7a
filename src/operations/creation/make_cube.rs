use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{SurfaceId, TopologyStore, VertexId};

use super::add_outward;

/// Creates an axis-aligned box triangulated into 12 outward faces.
///
/// Defaults to the cube of side 2 centered at the origin.
pub struct MakeCube {
    min_corner: Point3,
    max_corner: Point3,
}

impl Default for MakeCube {
    fn default() -> Self {
        Self::new()
    }
}

impl MakeCube {
    /// Creates a new `MakeCube` operation for the cube `[-1, 1]^3`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_corner: Point3::new(-1.0, -1.0, -1.0),
            max_corner: Point3::new(1.0, 1.0, 1.0),
        }
    }

    /// Uses the box spanned by two opposite corners instead.
    #[must_use]
    pub fn with_corners(mut self, min_corner: Point3, max_corner: Point3) -> Self {
        self.min_corner = min_corner;
        self.max_corner = max_corner;
        self
    }

    /// Executes the operation, returning a surface held by one handle.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] if the box is flat along
    /// some axis.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        if (0..3).any(|k| hi[k] <= lo[k]) {
            return Err(OperationError::InvalidArgument("box corners must span a volume".into()).into());
        }
        let center = nalgebra::center(&lo, &hi);
        let mut corners: HashMap<[bool; 3], VertexId> = HashMap::new();
        let mut corner = |store: &mut TopologyStore, key: [bool; 3]| {
            *corners.entry(key).or_insert_with(|| {
                let pick = |k: usize| if key[k] { hi[k] } else { lo[k] };
                store.new_vertex(Point3::new(pick(0), pick(1), pick(2)))
            })
        };

        let surface = store.add_surface();
        for axis in 0..3 {
            for side in [false, true] {
                let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
                let quad = [(false, false), (true, false), (true, true), (false, true)].map(|(a, b)| {
                    let mut key = [false; 3];
                    key[axis] = side;
                    key[u] = a;
                    key[v] = b;
                    corner(store, key)
                });
                add_outward(store, surface, [quad[0], quad[1], quad[2]], &center)?;
                add_outward(store, surface, [quad[0], quad[2], quad[3]], &center)?;
            }
        }
        Ok(surface)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::{Area, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn cube_counts() {
        let mut store = TopologyStore::new();
        let cube = MakeCube::new().execute(&mut store).unwrap();
        assert_eq!(store.face_count(cube).unwrap(), 12);
        assert_eq!(store.edge_count(cube).unwrap(), 18);
        assert_eq!(store.vertex_count_of(cube).unwrap(), 8);
        assert!(store.is_closed(cube).unwrap());
        assert!(store.is_orientable(cube).unwrap());
        assert_relative_eq!(Volume::new(cube).execute(&store).unwrap(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(Area::new(cube).execute(&store).unwrap(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn box_from_corners() {
        let mut store = TopologyStore::new();
        let b = MakeCube::new()
            .with_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_relative_eq!(Volume::new(b).execute(&store).unwrap(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_box_is_rejected() {
        let mut store = TopologyStore::new();
        let err = MakeCube::new()
            .with_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0))
            .execute(&mut store)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
