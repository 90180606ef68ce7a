use crate::error::Result;
use crate::topology::{SurfaceId, TopologyStore};

use super::engine::boolean_execute;
use super::select::BooleanOp;
use super::BooleanParams;

/// Computes the boolean union of two closed surfaces.
pub struct Union {
    first: SurfaceId,
    second: SurfaceId,
    params: BooleanParams,
}

impl Union {
    /// Creates a new `Union` operation.
    #[must_use]
    pub fn new(first: SurfaceId, second: SurfaceId) -> Self {
        Self {
            first,
            second,
            params: BooleanParams::default(),
        }
    }

    /// Sets the engine parameters.
    #[must_use]
    pub fn with_params(mut self, params: BooleanParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the union, creating the result surface in the store.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`](crate::error::TopologyError) if an operand
    /// is not closed, manifold and oriented,
    /// [`OperationError::SelfIntersecting`](crate::error::OperationError::SelfIntersecting)
    /// for a self-intersecting operand and
    /// [`OperationError::MutualIntersection`](crate::error::OperationError::MutualIntersection)
    /// for coincident or tangent operands.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        boolean_execute(store, self.first, self.second, BooleanOp::Union, &self.params)
    }
}

/// Computes the boolean intersection of two closed surfaces.
pub struct Intersection {
    first: SurfaceId,
    second: SurfaceId,
    params: BooleanParams,
}

impl Intersection {
    /// Creates a new `Intersection` operation.
    #[must_use]
    pub fn new(first: SurfaceId, second: SurfaceId) -> Self {
        Self {
            first,
            second,
            params: BooleanParams::default(),
        }
    }

    /// Sets the engine parameters.
    #[must_use]
    pub fn with_params(mut self, params: BooleanParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the intersection. Disjoint operands give an empty surface.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Union::execute`].
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        boolean_execute(store, self.first, self.second, BooleanOp::Intersection, &self.params)
    }
}

/// Subtracts the second surface from the first.
pub struct Difference {
    first: SurfaceId,
    second: SurfaceId,
    params: BooleanParams,
}

impl Difference {
    /// Creates a new `Difference` operation computing `first - second`.
    #[must_use]
    pub fn new(first: SurfaceId, second: SurfaceId) -> Self {
        Self {
            first,
            second,
            params: BooleanParams::default(),
        }
    }

    /// Sets the engine parameters.
    #[must_use]
    pub fn with_params(mut self, params: BooleanParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the difference.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Union::execute`].
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SurfaceId> {
        boolean_execute(store, self.first, self.second, BooleanOp::Difference, &self.params)
    }
}
