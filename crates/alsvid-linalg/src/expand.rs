//! Tensor expansion of super-operators onto a full qubit system.
//!
//! `expand` lifts a channel acting on a subset of qubits to the whole
//! system: identity on every free qubit, the original action on its
//! `qargs`. When the qubit arguments are not a contiguous ascending run
//! the basis of every Kraus matrix is permuted so the result lives in
//! the canonical ordering `[0, 1, …, N-1]`.

use crate::error::{LinalgError, LinalgResult};
use crate::matrix::{CMat, identity, kron};
use crate::superop::SuperOp;

/// Largest system the crate will materialise matrices for. An `N`-qubit
/// expansion allocates `2^N × 2^N` matrices, so this is a hard ceiling
/// rather than a soft target.
pub const N_MAX: usize = 16;

/// Permute the bits of `num`, read as a big-endian `|perm|`-bit integer.
///
/// The result's bit `i` equals `num`'s bit `perm[i]`, both counted from
/// the most significant end.
pub fn permute_bits(num: usize, perm: &[usize]) -> usize {
    let k = perm.len();
    let flip = |i: usize| k - i - 1;
    let mut out = 0usize;
    for (i, &fi) in perm.iter().enumerate() {
        out += ((num >> flip(fi)) & 1) << flip(i);
    }
    out
}

/// Expand a super-operator to act on a system of `qsize` qubits,
/// behaving as `op` on its qubit arguments and as identity elsewhere.
///
/// The result acts on all qubits, `qargs = [0, qsize)`.
pub fn expand(op: &SuperOp, qsize: usize) -> LinalgResult<SuperOp> {
    if qsize > N_MAX {
        return Err(LinalgError::QsizeTooLarge {
            qsize,
            max: N_MAX,
        });
    }
    let qargs = op.qargs();
    if let Some(&index) = qargs.iter().find(|&&q| q >= qsize) {
        return Err(LinalgError::QargsOutOfRange { index, qsize });
    }

    // Contiguous ascending run: plain Kronecker padding, no reordering.
    let contiguous = !qargs.is_empty() && qargs.windows(2).all(|w| w[1] == w[0] + 1);
    let kraus = if contiguous {
        let lo = qargs[0];
        let hi = qargs[qargs.len() - 1];
        let left = identity(1 << lo);
        let right = identity(1 << (qsize - hi - 1));
        op.kraus()
            .iter()
            .map(|k| kron(&kron(&left, k), &right))
            .collect()
    } else {
        expand_permuted(op, qsize)
    };

    SuperOp::new(kraus, (0..qsize).collect())
}

/// General expansion path: pad in the `(free ‖ qargs)` bit ordering,
/// then rewrite every Kraus matrix in the canonical basis.
fn expand_permuted(op: &SuperOp, qsize: usize) -> Vec<CMat> {
    let qargs = op.qargs();
    let free: Vec<usize> = (0..qsize).filter(|q| !qargs.contains(q)).collect();
    let order: Vec<usize> = free.iter().chain(qargs.iter()).copied().collect();
    let pad = identity(1 << free.len());
    let dim = 1usize << qsize;

    // Index `i` of the canonical basis corresponds to index
    // `permute_bits(i, order)` of the padded ordering: qubit `order[b]`
    // holds canonical bit `order[b]`, which sits at padded bit `b`.
    let to_padded: Vec<usize> = (0..dim).map(|i| permute_bits(i, &order)).collect();

    op.kraus()
        .iter()
        .map(|k| {
            let padded = kron(&pad, k);
            CMat::from_shape_fn((dim, dim), |(i, j)| padded[[to_padded[i], to_padded[j]]])
        })
        .collect()
}
