//! Alsvid SVTS Intermediate Representation
//!
//! This crate provides the super-operator-valued transition system
//! (SVTS): a finite control-flow graph whose edges carry quantum
//! super-operators annotated with the qubit indices they act on. It is
//! the representation handed to invariant-generation analyses.
//!
//! # Overview
//!
//! - **Locations**: integer-indexed nodes of a stable graph arena
//!   ([`Cfg`], [`Location`]) — loop back-edges make the graph cyclic,
//!   so locations are ids, never owned pointers
//! - **Ambient scope**: construction happens against a fixed
//!   program-global qubit count, acquired as an [`Ambient`] value
//! - **Combinators**: `skip`, `init`, `unit`, `comp`, `case`, `loop_`
//!   assemble systems compositionally; every rule validates its
//!   operators (unitarity, dimensions, measurement completeness)
//! - **Minimisation**: [`Svts::minimise`] compresses cutpoint-free
//!   paths into single edges over the full system
//!
//! # Example
//!
//! ```rust
//! use alsvid_ir::Ambient;
//! use alsvid_linalg::gates;
//!
//! let scope = Ambient::acquire(2).unwrap();
//! let h = scope.unit(gates::fixed("H").unwrap(), Some(vec![0])).unwrap();
//! let cx = scope.unit(gates::fixed("CX").unwrap(), Some(vec![0, 1])).unwrap();
//! let mut bell = scope.comp(h, cx).unwrap();
//!
//! bell.minimise().unwrap();
//! assert_eq!(bell.locations().len(), 2);
//! ```

pub mod ambient;
pub mod cfg;
pub mod error;
pub mod svts;

pub use ambient::Ambient;
pub use cfg::{Cfg, Location};
pub use error::{IrError, IrResult};
pub use svts::Svts;
