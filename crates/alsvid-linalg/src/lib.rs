//! Dense operator and super-operator algebra for Alsvid.
//!
//! This crate provides the numerical layer under the SVTS intermediate
//! representation:
//!
//! - **Matrices**: dense `Array2<Complex64>` primitives with explicit
//!   tolerance predicates ([`matrix`])
//! - **Gate table**: the fixed built-ins and parameterised families in
//!   the big-endian control convention ([`gates`])
//! - **Super-operators**: Kraus lists tied to ordered qubit arguments
//!   ([`SuperOp`])
//! - **Expansion**: lifting a channel from a qubit subset to the full
//!   system, with basis permutation for non-contiguous arguments
//!   ([`expand`])
//!
//! # Conventions
//!
//! All operators use the big-endian basis convention: basis index `v` of
//! a `k`-qubit operator reads `|v_{k-1} … v_0⟩` with the first qubit
//! argument on the most significant bit. Control gates therefore take
//! the control first (`CX` is `diag(I, X)`).
//!
//! Numerical predicates (identity, unitarity, completeness) compare
//! element-wise against [`EPSILON`].

pub mod error;
pub mod expand;
pub mod gates;
pub mod matrix;
pub mod superop;

pub use error::{LinalgError, LinalgResult};
pub use expand::{N_MAX, expand, permute_bits};
pub use matrix::{CMat, EPSILON};
pub use superop::SuperOp;
