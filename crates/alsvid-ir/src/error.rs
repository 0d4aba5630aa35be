//! Error types for the IR crate.

use alsvid_linalg::LinalgError;
use thiserror::Error;

use crate::cfg::Location;

/// Errors that can occur while constructing or transforming an SVTS.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Construction attempted without a usable ambient qubit count, or
    /// with a sub-system built under a different one.
    #[error(
        "no ambient qubit count: transition systems must be built inside \
         an acquired qubit scope matching their sub-systems"
    )]
    NoAmbientQsize,

    /// A unitary-transition operator failed the unitarity test.
    #[error("operator is not unitary within tolerance")]
    NotUnitary,

    /// Measurement operators of one branching construct differ in size.
    #[error("measurement operators have different dimensions: {expected} vs {got}")]
    IncompatibleMeasurementDims {
        /// Dimension of the first operator.
        expected: usize,
        /// The mismatching dimension.
        got: usize,
    },

    /// Measurement operators do not resolve the identity.
    #[error("measurement operators do not satisfy the completeness condition")]
    CompletenessViolation,

    /// A graph operation referenced a location that is not present.
    #[error("location {0:?} is not in the control-flow graph")]
    UnknownLocation(Location),

    /// A contraction would need two edges on one ordered location pair.
    #[error("contraction would create parallel edges {pre:?} -> {post:?}")]
    ParallelEdge {
        /// Source location of the colliding edges.
        pre: Location,
        /// Target location of the colliding edges.
        post: Location,
    },

    /// Underlying operator arithmetic failed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
