//! Error types for the lowering.

use alsvid_ir::IrError;
use alsvid_linalg::LinalgError;
use thiserror::Error;

/// Errors that can occur while lowering a program to an SVTS.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LowerError {
    /// Gate name not in the gate table and not a parameterised built-in.
    #[error("unknown gate: {0}")]
    UnknownGate(String),

    /// The parameter-expression evaluator met an unknown construct.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Gate-definition bodies may only contain gate calls.
    #[error("statement not supported inside a gate definition body")]
    UnsupportedInGateBody,

    /// Reference to an undeclared register or formal parameter.
    #[error("undefined identifier: {0}")]
    UndefinedIdentifier(String),

    /// Register index beyond the declared size.
    #[error("index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// A classical bit was read before any measurement wrote it.
    #[error("classical bit {register}[{index}] read before any measurement")]
    UnassignedBit { register: String, index: usize },

    /// A case head or guard literal does not fit the register.
    #[error("literal {value} does not fit in {bits} classical bit(s)")]
    LiteralOutOfRange { value: u64, bits: usize },

    /// Measurement source and target have different widths.
    #[error("measurement target '{target}' and source '{source_register}' have different widths")]
    MeasurementWidthMismatch {
        target: String,
        source_register: String,
    },

    /// SVTS construction failed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Operator arithmetic failed.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Result type for lowering operations.
pub type LowerResult<T> = Result<T, LowerError>;
