//! Built-in gate table.
//!
//! Multi-qubit control gates are stored in the big-endian convention:
//! the control qubit comes first in the qubit arguments and owns the
//! most significant basis bit, so `CX` is the textbook block matrix
//! `diag(I, X)`. `M0`/`M1` are the rank-1 measurement projectors.

use num_complex::Complex64;

use crate::matrix::{CMat, basis_projector, c64, identity, kron};

/// Look up a fixed (parameter-free) built-in gate by uppercased name.
pub fn fixed(name: &str) -> Option<CMat> {
    let m = match name {
        "I" => identity(2),
        "X" => pauli_x(),
        "Y" => pauli_y(),
        "Z" => pauli_z(),
        "H" => hadamard(),
        "M0" => basis_projector(2, 0),
        "M1" => basis_projector(2, 1),
        "CX" => controlled(&pauli_x()),
        "CY" => controlled(&pauli_y()),
        "CZ" => controlled(&pauli_z()),
        "CCX" => controlled(&controlled(&pauli_x())),
        _ => return None,
    };
    Some(m)
}

/// Materialise a parameterised built-in family from literal arguments.
///
/// Returns `None` when the name is not a parameterised built-in or the
/// argument count does not match the family.
pub fn parametric(name: &str, args: &[f64]) -> Option<CMat> {
    match (name, args) {
        ("P", [theta]) => Some(phase(*theta)),
        ("U", [theta, phi, lambda]) => Some(u_gate(*theta, *phi, *lambda)),
        ("CU", [theta, phi, lambda, gamma]) => Some(cu_gate(*theta, *phi, *lambda, *gamma)),
        _ => None,
    }
}

fn pauli_x() -> CMat {
    ndarray::arr2(&[
        [c64(0.0, 0.0), c64(1.0, 0.0)],
        [c64(1.0, 0.0), c64(0.0, 0.0)],
    ])
}

fn pauli_y() -> CMat {
    ndarray::arr2(&[
        [c64(0.0, 0.0), c64(0.0, -1.0)],
        [c64(0.0, 1.0), c64(0.0, 0.0)],
    ])
}

fn pauli_z() -> CMat {
    ndarray::arr2(&[
        [c64(1.0, 0.0), c64(0.0, 0.0)],
        [c64(0.0, 0.0), c64(-1.0, 0.0)],
    ])
}

fn hadamard() -> CMat {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    ndarray::arr2(&[
        [c64(s, 0.0), c64(s, 0.0)],
        [c64(s, 0.0), c64(-s, 0.0)],
    ])
}

/// Phase gate `P(θ) = diag(1, e^{iθ})`.
fn phase(theta: f64) -> CMat {
    ndarray::arr2(&[
        [c64(1.0, 0.0), c64(0.0, 0.0)],
        [c64(0.0, 0.0), Complex64::from_polar(1.0, theta)],
    ])
}

/// Universal single-qubit gate `U(θ, φ, λ)`.
fn u_gate(theta: f64, phi: f64, lambda: f64) -> CMat {
    let (half_sin, half_cos) = (theta / 2.0).sin_cos();
    ndarray::arr2(&[
        [
            c64(half_cos, 0.0),
            -Complex64::from_polar(half_sin, lambda),
        ],
        [
            Complex64::from_polar(half_sin, phi),
            Complex64::from_polar(half_cos, phi + lambda),
        ],
    ])
}

/// Controlled-U with global phase `γ` on the active block (big-endian).
fn cu_gate(theta: f64, phi: f64, lambda: f64, gamma: f64) -> CMat {
    let block = u_gate(theta, phi, lambda).map(|z| z * Complex64::from_polar(1.0, gamma));
    controlled(&block)
}

/// Big-endian controlled embedding `diag(I, U)` of a square block.
fn controlled(block: &CMat) -> CMat {
    let dim = block.nrows();
    let mut m = kron(&identity(2), &identity(dim));
    for ((i, j), z) in block.indexed_iter() {
        m[[dim + i, dim + j]] = *z;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{EPSILON, approx_eq, is_unitary};

    #[test]
    fn test_fixed_gates_unitary() {
        for name in ["I", "X", "Y", "Z", "H", "CX", "CY", "CZ", "CCX"] {
            let m = fixed(name).unwrap();
            assert!(is_unitary(&m, EPSILON), "{name} is not unitary");
        }
    }

    #[test]
    fn test_measurement_projectors() {
        let m0 = fixed("M0").unwrap();
        let m1 = fixed("M1").unwrap();
        assert!(approx_eq(&(&m0 + &m1), &identity(2), EPSILON));
        assert!(!is_unitary(&m0, EPSILON));
    }

    #[test]
    fn test_cx_big_endian_action() {
        // Control is the most significant bit: |10⟩ -> |11⟩, |11⟩ -> |10⟩.
        let cx = fixed("CX").unwrap();
        assert_eq!(cx[[3, 2]], c64(1.0, 0.0));
        assert_eq!(cx[[2, 3]], c64(1.0, 0.0));
        assert_eq!(cx[[0, 0]], c64(1.0, 0.0));
        assert_eq!(cx[[1, 1]], c64(1.0, 0.0));
        assert_eq!(cx[[2, 2]], c64(0.0, 0.0));
    }

    #[test]
    fn test_ccx_swaps_top_pair() {
        // Both controls set (basis 6 and 7) exchange; everything else fixed.
        let ccx = fixed("CCX").unwrap();
        for v in 0..6 {
            assert_eq!(ccx[[v, v]], c64(1.0, 0.0));
        }
        assert_eq!(ccx[[7, 6]], c64(1.0, 0.0));
        assert_eq!(ccx[[6, 7]], c64(1.0, 0.0));
    }

    #[test]
    fn test_phase_pi_is_z() {
        let p = parametric("P", &[std::f64::consts::PI]).unwrap();
        let z = fixed("Z").unwrap();
        assert!(approx_eq(&p, &z, EPSILON));
    }

    #[test]
    fn test_u_gate_specialises_to_x() {
        // U(π, 0, π) = X up to numerical tolerance.
        let pi = std::f64::consts::PI;
        let u = parametric("U", &[pi, 0.0, pi]).unwrap();
        let x = fixed("X").unwrap();
        assert!(approx_eq(&u, &x, EPSILON));
    }

    #[test]
    fn test_cu_unitary_and_controlled() {
        let cu = parametric("CU", &[0.7, 0.3, 1.1, 0.2]).unwrap();
        assert!(is_unitary(&cu, EPSILON));
        // Control-off block is untouched.
        assert_eq!(cu[[0, 0]], c64(1.0, 0.0));
        assert_eq!(cu[[1, 1]], c64(1.0, 0.0));
        assert_eq!(cu[[0, 2]], c64(0.0, 0.0));
    }

    #[test]
    fn test_unknown_names() {
        assert!(fixed("SWAP").is_none());
        assert!(parametric("P", &[1.0, 2.0]).is_none());
        assert!(parametric("RZ", &[1.0]).is_none());
    }
}
