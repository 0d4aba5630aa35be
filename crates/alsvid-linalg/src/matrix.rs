//! Dense complex matrix primitives.
//!
//! All operators in Alsvid are dense `Array2<Complex64>` matrices in the
//! big-endian basis convention: for a `k`-qubit operator the basis index
//! `v` is read as `|v_{k-1} … v_1 v_0⟩` with `v_{k-1}` the most
//! significant bit, so the first qubit argument owns the top bit.

use ndarray::Array2;
use num_complex::Complex64;

/// Dense complex matrix.
pub type CMat = Array2<Complex64>;

/// Element-wise numerical tolerance for identity, unitarity and
/// completeness predicates.
pub const EPSILON: f64 = 1e-9;

/// Shorthand complex constructor.
#[inline]
pub fn c64(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Identity matrix of the given dimension.
pub fn identity(dim: usize) -> CMat {
    CMat::eye(dim)
}

/// Conjugate transpose.
pub fn adjoint(m: &CMat) -> CMat {
    m.t().map(|z| z.conj())
}

/// Kronecker product.
pub fn kron(a: &CMat, b: &CMat) -> CMat {
    ndarray::linalg::kron(a, b)
}

/// Rank-1 projector `|v⟩⟨v|` onto a computational-basis state.
pub fn basis_projector(dim: usize, v: usize) -> CMat {
    let mut m = CMat::zeros((dim, dim));
    m[[v, v]] = c64(1.0, 0.0);
    m
}

/// Sum of basis projectors over the given indices.
pub fn basis_projector_sum(dim: usize, indices: impl IntoIterator<Item = usize>) -> CMat {
    let mut m = CMat::zeros((dim, dim));
    for v in indices {
        m[[v, v]] = c64(1.0, 0.0);
    }
    m
}

/// Largest element magnitude.
pub fn max_abs(m: &CMat) -> f64 {
    m.iter().map(|z| z.norm()).fold(0.0, f64::max)
}

/// Check whether a matrix is the identity within `eps`.
pub fn is_identity(m: &CMat, eps: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    m.indexed_iter().all(|((i, j), z)| {
        let expected = if i == j { 1.0 } else { 0.0 };
        (z - c64(expected, 0.0)).norm() <= eps
    })
}

/// Check whether a matrix is unitary within `eps`.
pub fn is_unitary(m: &CMat, eps: f64) -> bool {
    m.nrows() == m.ncols() && is_identity(&adjoint(m).dot(m), eps)
}

/// Element-wise approximate equality.
pub fn approx_eq(a: &CMat, b: &CMat, eps: f64) -> bool {
    a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hadamard() -> CMat {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        ndarray::arr2(&[
            [c64(s, 0.0), c64(s, 0.0)],
            [c64(s, 0.0), c64(-s, 0.0)],
        ])
    }

    #[test]
    fn test_identity_predicate() {
        assert!(is_identity(&identity(4), EPSILON));
        assert!(!is_identity(&basis_projector(2, 0), EPSILON));
    }

    #[test]
    fn test_adjoint_involution() {
        let h = hadamard();
        assert!(approx_eq(&adjoint(&adjoint(&h)), &h, EPSILON));
    }

    #[test]
    fn test_hadamard_unitary() {
        assert!(is_unitary(&hadamard(), EPSILON));
        // Projectors are not unitary.
        assert!(!is_unitary(&basis_projector(2, 1), EPSILON));
    }

    #[test]
    fn test_kron_dims() {
        let m = kron(&identity(2), &identity(4));
        assert_eq!(m.nrows(), 8);
        assert!(is_identity(&m, EPSILON));
    }

    #[test]
    fn test_projector_sum_completeness() {
        let m = basis_projector_sum(4, 0..4);
        assert!(is_identity(&m, EPSILON));
    }
}
