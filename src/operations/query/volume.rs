use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{Point3, Vector3};
use crate::topology::{SurfaceId, TopologyStore};

/// Computes the signed volume enclosed by a closed surface.
///
/// Sums the signed tetrahedra `(1/6) * v0 . (v1 x v2)` spanned by each face
/// and the origin. Outward-oriented surfaces give a positive volume.
pub struct Volume {
    surface: SurfaceId,
}

impl Volume {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query, returning the signed volume.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotClosed`] if the surface has a boundary.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        if !store.is_closed(self.surface)? {
            return Err(TopologyError::NotClosed.into());
        }
        let mut signed_volume = 0.0;
        for &f in store.surface_faces(self.surface)? {
            let [a, b, c] = store.triangle_points(f)?;
            signed_volume += a.coords.dot(&b.coords.cross(&c.coords));
        }
        Ok(signed_volume / 6.0)
    }
}

/// Computes the centroid of the volume enclosed by a closed surface.
pub struct CenterOfMass {
    surface: SurfaceId,
}

impl CenterOfMass {
    /// Creates a new `CenterOfMass` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NotClosed`] for an open surface and
    /// [`GeometryError::Degenerate`] if it encloses no volume.
    pub fn execute(&self, store: &TopologyStore) -> Result<Point3> {
        if !store.is_closed(self.surface)? {
            return Err(TopologyError::NotClosed.into());
        }
        let mut volume = 0.0;
        let mut moment = Vector3::zeros();
        for &f in store.surface_faces(self.surface)? {
            let [a, b, c] = store.triangle_points(f)?;
            let v = a.coords.dot(&b.coords.cross(&c.coords)) / 6.0;
            volume += v;
            moment += (a.coords + b.coords + c.coords) * (v / 4.0);
        }
        if volume == 0.0 {
            return Err(GeometryError::Degenerate("surface encloses no volume".into()).into());
        }
        Ok(Point3::from(moment / volume))
    }
}

/// Computes the area-weighted centroid of a surface's faces.
pub struct CenterOfArea {
    surface: SurfaceId,
}

impl CenterOfArea {
    /// Creates a new `CenterOfArea` query.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self { surface }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the surface has no area.
    pub fn execute(&self, store: &TopologyStore) -> Result<Point3> {
        let mut area = 0.0;
        let mut moment = Vector3::zeros();
        for &f in store.surface_faces(self.surface)? {
            let [a, b, c] = store.triangle_points(f)?;
            let w = store.triangle_area(f)?;
            area += w;
            moment += (a.coords + b.coords + c.coords) * (w / 3.0);
        }
        if area == 0.0 {
            return Err(GeometryError::Degenerate("surface has no area".into()).into());
        }
        Ok(Point3::from(moment / area))
    }
}
