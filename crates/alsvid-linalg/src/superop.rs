//! Kraus representation of quantum super-operators.

use std::fmt;

use crate::error::{LinalgError, LinalgResult};
use crate::matrix::{CMat, EPSILON, adjoint, identity, is_identity, max_abs};

/// A super-operator in Kraus form, together with the ordered qubit
/// arguments it acts on.
///
/// The channel semantics is `ρ ↦ Σ K_i ρ K_i†` over `qargs`; a unitary
/// `U` embeds as the single-element list `{U}`. The qubit arguments are
/// ordered: `qargs[0]` owns the most significant basis bit.
#[derive(Debug, Clone)]
pub struct SuperOp {
    kraus: Vec<CMat>,
    qargs: Vec<usize>,
}

impl SuperOp {
    /// Build a super-operator from a Kraus list and its qubit arguments.
    ///
    /// Fails with [`LinalgError::EmptyKraus`] on an empty list,
    /// [`LinalgError::DuplicateQargs`] on repeated qubit indices and
    /// [`LinalgError::DimMismatch`] when any matrix is not
    /// `2^|qargs| × 2^|qargs|`.
    pub fn new(kraus: Vec<CMat>, qargs: Vec<usize>) -> LinalgResult<Self> {
        if kraus.is_empty() {
            return Err(LinalgError::EmptyKraus);
        }
        let mut seen = qargs.clone();
        seen.sort_unstable();
        if seen.windows(2).any(|w| w[0] == w[1]) {
            return Err(LinalgError::DuplicateQargs(qargs));
        }
        let dim = 1usize << qargs.len();
        for k in &kraus {
            if k.nrows() != dim || k.ncols() != dim {
                return Err(LinalgError::DimMismatch {
                    dim: k.nrows(),
                    qubits: qargs.len(),
                });
            }
        }
        Ok(Self { kraus, qargs })
    }

    /// Embed a single unitary (or measurement operator) as a
    /// one-element Kraus list.
    pub fn unitary(op: CMat, qargs: Vec<usize>) -> LinalgResult<Self> {
        Self::new(vec![op], qargs)
    }

    /// Identity channel on the given qubit arguments.
    pub fn identity_on(qargs: Vec<usize>) -> LinalgResult<Self> {
        let dim = 1usize << qargs.len();
        Self::new(vec![identity(dim)], qargs)
    }

    /// The Kraus matrices.
    pub fn kraus(&self) -> &[CMat] {
        &self.kraus
    }

    /// The ordered qubit arguments.
    pub fn qargs(&self) -> &[usize] {
        &self.qargs
    }

    /// Matrix dimension (`2^|qargs|`).
    pub fn dim(&self) -> usize {
        1usize << self.qargs.len()
    }

    /// Number of qubits acted on.
    pub fn num_qubits(&self) -> usize {
        self.qargs.len()
    }

    /// Sequential composition on identical qubit arguments: the Kraus
    /// list `{S_i · R_j}` of `self` applied after `rhs`.
    ///
    /// Numerically-zero products are pruned; the result keeps at least
    /// one matrix so the representation stays well-formed.
    pub fn dot(&self, rhs: &SuperOp) -> LinalgResult<SuperOp> {
        if self.qargs != rhs.qargs {
            return Err(LinalgError::QargsMismatch {
                lhs: self.qargs.clone(),
                rhs: rhs.qargs.clone(),
            });
        }
        let mut kraus = Vec::with_capacity(self.kraus.len() * rhs.kraus.len());
        for s in &self.kraus {
            for r in &rhs.kraus {
                let prod = s.dot(r);
                if max_abs(&prod) > EPSILON {
                    kraus.push(prod);
                }
            }
        }
        if kraus.is_empty() {
            kraus.push(CMat::zeros((self.dim(), self.dim())));
        }
        SuperOp::new(kraus, self.qargs.clone())
    }

    /// Sequential composition with `self` applied first: `rhs ∘ self`.
    pub fn then(&self, rhs: &SuperOp) -> LinalgResult<SuperOp> {
        rhs.dot(self)
    }

    /// `Σ K_i† K_i`, the operator tested against identity by the
    /// completeness predicates.
    pub fn adjoint_sum(&self) -> CMat {
        let mut acc = CMat::zeros((self.dim(), self.dim()));
        for k in &self.kraus {
            acc = acc + adjoint(k).dot(k);
        }
        acc
    }

    /// Check the measurement completeness condition `Σ K_i† K_i = I`.
    pub fn is_complete(&self, eps: f64) -> bool {
        is_identity(&self.adjoint_sum(), eps)
    }

    /// Check whether this channel is numerically the identity channel.
    ///
    /// The combinators only ever produce identity channels as a single
    /// Kraus matrix, so the single-element form is the one tested.
    pub fn is_identity(&self, eps: f64) -> bool {
        self.kraus.len() == 1 && is_identity(&self.kraus[0], eps)
    }
}

impl fmt::Display for SuperOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SuperOp({} Kraus, dim {}, qargs {:?})",
            self.kraus.len(),
            self.dim(),
            self.qargs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates;
    use crate::matrix::{approx_eq, basis_projector};

    #[test]
    fn test_new_rejects_duplicates() {
        let err = SuperOp::unitary(identity(4), vec![1, 1]).unwrap_err();
        assert!(matches!(err, LinalgError::DuplicateQargs(_)));
    }

    #[test]
    fn test_new_rejects_dim_mismatch() {
        let err = SuperOp::unitary(identity(2), vec![0, 1]).unwrap_err();
        assert!(matches!(err, LinalgError::DimMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = SuperOp::new(vec![], vec![0]).unwrap_err();
        assert!(matches!(err, LinalgError::EmptyKraus));
    }

    #[test]
    fn test_dot_of_unitaries_is_product() {
        let h = SuperOp::unitary(gates::fixed("H").unwrap(), vec![0]).unwrap();
        let hh = h.dot(&h).unwrap();
        assert_eq!(hh.kraus().len(), 1);
        assert!(hh.is_identity(EPSILON));
    }

    #[test]
    fn test_dot_prunes_orthogonal_products() {
        // {M0, M1} ∘ {M0, M1} has M0·M1 = M1·M0 = 0 pruned away.
        let meas = SuperOp::new(
            vec![basis_projector(2, 0), basis_projector(2, 1)],
            vec![0],
        )
        .unwrap();
        let twice = meas.dot(&meas).unwrap();
        assert_eq!(twice.kraus().len(), 2);
        assert!(twice.is_complete(EPSILON));
    }

    #[test]
    fn test_dot_requires_matching_qargs() {
        let a = SuperOp::identity_on(vec![0]).unwrap();
        let b = SuperOp::identity_on(vec![1]).unwrap();
        assert!(matches!(
            a.dot(&b).unwrap_err(),
            LinalgError::QargsMismatch { .. }
        ));
    }

    #[test]
    fn test_then_order() {
        // X then M0: kraus = M0 · X, which maps |0⟩ onto |0⟩⟨1|-style action.
        let x = SuperOp::unitary(gates::fixed("X").unwrap(), vec![0]).unwrap();
        let m0 = SuperOp::unitary(basis_projector(2, 0), vec![0]).unwrap();
        let composed = x.then(&m0).unwrap();
        let expected = basis_projector(2, 0).dot(&gates::fixed("X").unwrap());
        assert!(approx_eq(&composed.kraus()[0], &expected, EPSILON));
    }

    #[test]
    fn test_reset_channel_complete_but_not_identity() {
        // Reset on one qubit: {|0⟩⟨0|, |0⟩⟨1|}.
        let mut k1 = CMat::zeros((2, 2));
        k1[[0, 0]] = crate::matrix::c64(1.0, 0.0);
        let mut k2 = CMat::zeros((2, 2));
        k2[[0, 1]] = crate::matrix::c64(1.0, 0.0);
        let reset = SuperOp::new(vec![k1, k2], vec![0]).unwrap();
        assert!(reset.is_complete(EPSILON));
        assert!(!reset.is_identity(EPSILON));
    }
}
