use thiserror::Error;

/// Top-level error type for the trisurf mesh kernel.
#[derive(Debug, Error)]
pub enum TrisurfError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to mesh connectivity.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("degenerate topology: {0}")]
    Degenerate(String),

    #[error("surface is not closed")]
    NotClosed,

    #[error("surface is not manifold")]
    NotManifold,

    #[error("surface is not consistently oriented")]
    NotOriented,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to mesh operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("surfaces mutually intersect: {0}")]
    MutualIntersection(String),

    #[error("surface is self-intersecting")]
    SelfIntersecting,

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised while reading or writing the persisted mesh format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for results using [`TrisurfError`].
pub type Result<T> = std::result::Result<T, TrisurfError>;

impl TrisurfError {
    /// Returns `true` if this is a degenerate-topology error.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Topology(TopologyError::Degenerate(_)))
    }

    /// Returns `true` if this error reports mutually intersecting inputs.
    #[must_use]
    pub fn is_mutual_intersection(&self) -> bool {
        matches!(self, Self::Operation(OperationError::MutualIntersection(_)))
    }

    /// Returns `true` if this error reports an invalid argument.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Operation(OperationError::InvalidArgument(_)))
    }
}
