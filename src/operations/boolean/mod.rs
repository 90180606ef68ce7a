//! Boolean set operations on closed, manifold, oriented surfaces.

mod assemble;
mod classify;
mod engine;
mod face_intersection;
mod ops;
mod select;
mod split;

pub use ops::{Difference, Intersection, Union};
pub use select::BooleanOp;

/// Tunables of the boolean engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BooleanParams {
    /// Intersection points closer than this fraction of the operands'
    /// bounding box diagonal are merged.
    pub weld_tolerance: f64,
    /// Reject self-intersecting operands before computing anything.
    pub check_self_intersection: bool,
}

impl Default for BooleanParams {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-9,
            check_self_intersection: true,
        }
    }
}

impl BooleanParams {
    /// Sets the weld tolerance.
    #[must_use]
    pub fn with_weld_tolerance(mut self, weld_tolerance: f64) -> Self {
        self.weld_tolerance = weld_tolerance;
        self
    }

    /// Enables or disables the self-intersection check of the operands.
    #[must_use]
    pub fn with_self_intersection_check(mut self, enabled: bool) -> Self {
        self.check_self_intersection = enabled;
        self
    }
}
