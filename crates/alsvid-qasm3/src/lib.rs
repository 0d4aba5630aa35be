//! `OpenQASM` 3 dialect front-end for Alsvid
//!
//! This crate lowers a gate-level quantum program — qubit and classical
//! declarations, unitary gates, measurements, resets, switch branching
//! on classical registers and while loops guarded by classical
//! comparisons — into the super-operator-valued transition system of
//! `alsvid-ir`.
//!
//! Surface-syntax parsing is an external collaborator: this crate
//! starts at the [`ast`] statement list such a parser produces.
//!
//! # Example
//!
//! ```rust
//! use alsvid_qasm3::ast::{GateCall, Program, QubitOperand, Statement};
//! use alsvid_qasm3::lower;
//!
//! let program = Program::new(vec![
//!     Statement::QubitDecl { name: "q".into(), size: 1 },
//!     Statement::Gate(GateCall::new("h", vec![QubitOperand::indexed("q", 0)])),
//! ]);
//!
//! let ts = lower(&program).unwrap();
//! assert_eq!(ts.qsize(), 1);
//! assert_eq!(ts.locations().len(), 2);
//! ```

pub mod ast;
pub mod error;
pub mod lower;

pub use error::{LowerError, LowerResult};
pub use lower::{Lowerer, count_qubits, lower};
