//! Error types for the linear-algebra crate.

use thiserror::Error;

/// Errors that can occur in operator and super-operator arithmetic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinalgError {
    /// Qubit argument list contains a repeated index.
    #[error("qargs contain duplicate qubit indices: {0:?}")]
    DuplicateQargs(Vec<usize>),

    /// Qubit argument outside the ambient system.
    #[error("qubit index {index} outside the system of {qsize} qubit(s)")]
    QargsOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of qubits in the ambient system.
        qsize: usize,
    },

    /// Operator dimension inconsistent with the qubit argument count.
    #[error("operator dimension {dim} does not match {qubits} qubit(s)")]
    DimMismatch {
        /// Matrix dimension encountered.
        dim: usize,
        /// Number of qubits the operator was declared on.
        qubits: usize,
    },

    /// Two super-operators declared on different qubit arguments.
    #[error("super-operators act on different qubit arguments: {lhs:?} vs {rhs:?}")]
    QargsMismatch {
        /// Left-hand qubit arguments.
        lhs: Vec<usize>,
        /// Right-hand qubit arguments.
        rhs: Vec<usize>,
    },

    /// A Kraus representation must carry at least one matrix.
    #[error("Kraus list must contain at least one matrix")]
    EmptyKraus,

    /// Refusal to materialise matrices beyond the supported system size.
    #[error("system of {qsize} qubits exceeds the supported maximum of {max}")]
    QsizeTooLarge {
        /// Requested system size.
        qsize: usize,
        /// The configured ceiling.
        max: usize,
    },
}

/// Result type for linear-algebra operations.
pub type LinalgResult<T> = Result<T, LinalgError>;
