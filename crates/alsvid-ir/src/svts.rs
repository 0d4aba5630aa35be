//! Super-operator-valued transition systems and their combinators.
//!
//! An [`Svts`] is a control-flow graph whose edges carry super-operators,
//! together with distinguished entry (`lin`) and exit (`lout`) locations.
//! The six construction rules — `skip`, `init`, `unit`, `comp`, `case`
//! and `loop_` — live on [`Ambient`], so a transition system can only be
//! built inside an acquired qubit scope.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::debug;

use alsvid_linalg::matrix::{CMat, EPSILON, adjoint, c64, is_identity, is_unitary};
use alsvid_linalg::{SuperOp, expand};

use crate::ambient::Ambient;
use crate::cfg::{Cfg, Location};
use crate::error::{IrError, IrResult};

/// A super-operator-valued transition system.
#[derive(Debug, Clone)]
pub struct Svts {
    qsize: usize,
    cfg: Cfg,
    lin: Location,
    lout: Location,
}

impl Svts {
    /// Two fresh locations, no transitions yet.
    fn fresh(qsize: usize) -> Self {
        let mut cfg = Cfg::new();
        let lin = cfg.add_location();
        let lout = cfg.add_location();
        Self {
            qsize,
            cfg,
            lin,
            lout,
        }
    }

    /// The program-global qubit count this system was built under.
    pub fn qsize(&self) -> usize {
        self.qsize
    }

    /// Entry location.
    pub fn lin(&self) -> Location {
        self.lin
    }

    /// Exit location.
    pub fn lout(&self) -> Location {
        self.lout
    }

    /// All locations, sorted by index.
    pub fn locations(&self) -> Vec<Location> {
        self.cfg.locations()
    }

    /// Read access to the underlying graph.
    pub fn cfg(&self) -> &Cfg {
        &self.cfg
    }

    /// Iterate over transitions `(pre, post, super-operator)` in
    /// lexicographic `(pre, post)` order. Deterministic for an
    /// unmutated system.
    pub fn transitions(&self) -> impl Iterator<Item = (Location, Location, &SuperOp)> {
        self.cfg.sorted_edges().into_iter()
    }

    /// Identity channel over the whole system.
    fn full_identity(&self) -> IrResult<SuperOp> {
        Ok(SuperOp::identity_on((0..self.qsize).collect())?)
    }

    /// Append an identity self-loop at the exit location, making it a
    /// fixed point for downstream analyses.
    pub fn add_outloop(&mut self) -> IrResult<()> {
        let op = self.full_identity()?;
        self.cfg.set_edge(self.lout, self.lout, op);
        Ok(())
    }

    /// Compress every maximal cutpoint-free path into a single edge
    /// carrying the Kronecker-composed super-operator over all qubits.
    ///
    /// Branching and loop structure is preserved: chains stop at any
    /// location with in-degree above one or out-degree other than one.
    /// Every cycle passes through a loop head, which keeps its exit
    /// guard and so is never chain-interior. Compressed (and identity)
    /// edges act on all qubit indices, so the narrow `qargs` of `skip`
    /// edges never survive minimisation.
    pub fn minimise(&mut self) -> IrResult<()> {
        let mut pending = VecDeque::from([self.lin]);
        let mut visited = FxHashSet::default();
        visited.insert(self.lin);

        while let Some(head) = pending.pop_front() {
            if !self.cfg.contains(head) {
                continue;
            }
            // Branch and join locations keep their own edges untouched;
            // their successors start fresh chains.
            if !(self.cfg.in_degree(head) <= 1 && self.cfg.out_degree(head) == 1) {
                let successors: Vec<Location> =
                    self.cfg.successors(head).iter().map(|(v, _)| *v).collect();
                for s in successors {
                    if s != head && visited.insert(s) {
                        pending.push_back(s);
                    }
                }
                continue;
            }

            // Walk the maximal cutpoint-free run from `head`, composing
            // the traversed super-operators over the full system.
            let mut acc: Option<SuperOp> = None;
            let mut locs: Vec<Location> = Vec::new();
            let mut u = head;
            while self.cfg.in_degree(u) <= 1 && self.cfg.out_degree(u) == 1 {
                let (v, op) = {
                    let mut succ = self.cfg.successors(u);
                    let (v, op) = succ.pop().expect("out-degree is one");
                    (v, op.clone())
                };
                if !op.is_identity(EPSILON) {
                    let widened = expand(&op, self.qsize)?;
                    acc = Some(match acc {
                        None => widened,
                        Some(s) => s.then(&widened)?,
                    });
                }
                locs.push(v);
                u = v;
            }

            let compound = match acc {
                Some(s) => s,
                None => self.full_identity()?,
            };

            let tail = match locs.len() {
                0 => continue,
                1 => {
                    // A one-edge run: widen the payload in place.
                    self.cfg.set_edge(head, locs[0], compound);
                    locs[0]
                }
                n => {
                    debug!(locations = n, "compressing cutpoint-free path");
                    for &l in &locs {
                        visited.remove(&l);
                    }
                    let tail = self.cfg.contract_locations(&locs)?;
                    if locs.contains(&self.lout) {
                        self.lout = tail;
                    }
                    if locs.contains(&self.lin) {
                        self.lin = tail;
                    }
                    self.cfg.set_edge(head, tail, compound);
                    tail
                }
            };

            if visited.insert(tail) {
                pending.push_back(tail);
            }
        }
        Ok(())
    }
}

impl Ambient {
    /// Default qubit arguments (all qubits), validated against the
    /// scope's system size.
    fn resolve_qargs(&self, qargs: Option<Vec<usize>>) -> IrResult<Vec<usize>> {
        let qargs = qargs.unwrap_or_else(|| (0..self.qsize()).collect());
        if let Some(&index) = qargs.iter().find(|&&q| q >= self.qsize()) {
            return Err(IrError::Linalg(
                alsvid_linalg::LinalgError::QargsOutOfRange {
                    index,
                    qsize: self.qsize(),
                },
            ));
        }
        Ok(qargs)
    }

    /// A sub-system may only be combined inside the scope it was built
    /// under.
    fn check_member(&self, ts: &Svts) -> IrResult<()> {
        if ts.qsize != self.qsize() {
            return Err(IrError::NoAmbientQsize);
        }
        Ok(())
    }

    /// The no-op transition rule: a single identity edge.
    ///
    /// By convention the edge is labelled with the single-qubit identity
    /// on qubit 0; `minimise` widens it to the full system.
    pub fn skip(&self) -> IrResult<Svts> {
        let mut ts = Svts::fresh(self.qsize());
        ts.cfg
            .set_edge(ts.lin, ts.lout, SuperOp::identity_on(vec![0])?);
        Ok(ts)
    }

    /// The initiation rule: reset the given qubits (default: all) to
    /// `|0⟩` via the Kraus list `{|0⟩⟨i|}`.
    pub fn init(&self, qargs: Option<Vec<usize>>) -> IrResult<Svts> {
        let qargs = self.resolve_qargs(qargs)?;
        let dim = 1usize << qargs.len();
        let kraus = (0..dim)
            .map(|i| {
                let mut k = CMat::zeros((dim, dim));
                k[[0, i]] = c64(1.0, 0.0);
                k
            })
            .collect();
        let mut ts = Svts::fresh(self.qsize());
        ts.cfg.set_edge(ts.lin, ts.lout, SuperOp::new(kraus, qargs)?);
        Ok(ts)
    }

    /// The unitary transformation rule: a single-Kraus edge `{U}`.
    pub fn unit(&self, op: CMat, qargs: Option<Vec<usize>>) -> IrResult<Svts> {
        let qargs = self.resolve_qargs(qargs)?;
        if !is_unitary(&op, EPSILON) {
            return Err(IrError::NotUnitary);
        }
        let mut ts = Svts::fresh(self.qsize());
        ts.cfg
            .set_edge(ts.lin, ts.lout, SuperOp::unitary(op, qargs)?);
        Ok(ts)
    }

    /// Sequential composition: the exit of `l` is identified with the
    /// entry of `r`.
    pub fn comp(&self, l: Svts, r: Svts) -> IrResult<Svts> {
        self.check_member(&l)?;
        self.check_member(&r)?;
        let mut cfg = l.cfg;
        let r_lin = r.lin;
        let translation = cfg.substitute_location(l.lout, &r.cfg, |_, _| r_lin)?;
        Ok(Svts {
            qsize: self.qsize(),
            cfg,
            lin: l.lin,
            lout: translation[&r.lout],
        })
    }

    /// The quantum case rule: one branch per measurement outcome.
    ///
    /// Validates that all measurement operators share one dimension and
    /// jointly satisfy the completeness condition `Σ M_k† M_k = I`.
    pub fn case(&self, cases: Vec<(CMat, Svts)>, qargs: Option<Vec<usize>>) -> IrResult<Svts> {
        let qargs = self.resolve_qargs(qargs)?;
        let dim = 1usize << qargs.len();
        if let Some((m, _)) = cases.iter().find(|(m, _)| m.nrows() != dim || m.ncols() != dim) {
            return Err(IrError::IncompatibleMeasurementDims {
                expected: dim,
                got: m.nrows(),
            });
        }
        let mut resolution = CMat::zeros((dim, dim));
        for (m, _) in &cases {
            resolution = resolution + adjoint(m).dot(m);
        }
        if !is_identity(&resolution, EPSILON) {
            return Err(IrError::CompletenessViolation);
        }

        let mut ts = Svts::fresh(self.qsize());
        let mut exits = Vec::with_capacity(cases.len() + 1);
        for (m, sub) in cases {
            self.check_member(&sub)?;
            let guard = SuperOp::unitary(m, qargs.clone())?;
            let translation = ts.cfg.compose(&sub.cfg, vec![(ts.lin, sub.lin, guard)])?;
            exits.push(translation[&sub.lout]);
        }
        exits.push(ts.lout);
        ts.lout = ts.cfg.contract_locations(&exits)?;
        Ok(ts)
    }

    /// The quantum while rule: `t_op` guards the body, `f_op` guards
    /// the exit, and the body's exit is folded back onto the entry.
    ///
    /// Validates matching dimensions and `T + F = I`.
    pub fn loop_(
        &self,
        t_op: CMat,
        f_op: CMat,
        body: Svts,
        qargs: Option<Vec<usize>>,
    ) -> IrResult<Svts> {
        let qargs = self.resolve_qargs(qargs)?;
        if t_op.shape() != f_op.shape() {
            return Err(IrError::IncompatibleMeasurementDims {
                expected: t_op.nrows(),
                got: f_op.nrows(),
            });
        }
        if !is_identity(&(&t_op + &f_op), EPSILON) {
            return Err(IrError::CompletenessViolation);
        }
        self.check_member(&body)?;

        let mut ts = Svts::fresh(self.qsize());
        ts.cfg
            .set_edge(ts.lin, ts.lout, SuperOp::unitary(f_op, qargs.clone())?);
        let guard = SuperOp::unitary(t_op, qargs)?;
        let translation = ts.cfg.compose(&body.cfg, vec![(ts.lin, body.lin, guard)])?;
        ts.lin = ts
            .cfg
            .contract_locations(&[translation[&body.lout], ts.lin])?;
        Ok(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_linalg::gates;
    use alsvid_linalg::matrix::basis_projector;

    #[test]
    fn test_skip_shape() {
        let scope = Ambient::acquire(2).unwrap();
        let ts = scope.skip().unwrap();
        assert_eq!(ts.locations().len(), 2);
        let edges: Vec<_> = ts.transitions().collect();
        assert_eq!(edges.len(), 1);
        let (pre, post, op) = &edges[0];
        assert_eq!(*pre, ts.lin());
        assert_eq!(*post, ts.lout());
        assert_eq!(op.qargs(), &[0]);
        assert!(op.is_identity(EPSILON));
    }

    #[test]
    fn test_init_kraus_list() {
        let scope = Ambient::acquire(2).unwrap();
        let ts = scope.init(Some(vec![1])).unwrap();
        let (_, _, op) = ts.transitions().next().unwrap();
        assert_eq!(op.kraus().len(), 2);
        assert_eq!(op.qargs(), &[1]);
        assert!(op.is_complete(EPSILON));
        // |0⟩⟨0| and |0⟩⟨1|
        assert_eq!(op.kraus()[0][[0, 0]], c64(1.0, 0.0));
        assert_eq!(op.kraus()[1][[0, 1]], c64(1.0, 0.0));
    }

    #[test]
    fn test_unit_rejects_non_unitary() {
        let scope = Ambient::acquire(1).unwrap();
        let err = scope
            .unit(basis_projector(2, 0), Some(vec![0]))
            .unwrap_err();
        assert!(matches!(err, IrError::NotUnitary));
    }

    #[test]
    fn test_unit_rejects_out_of_range_qargs() {
        let scope = Ambient::acquire(1).unwrap();
        let err = scope
            .unit(gates::fixed("H").unwrap(), Some(vec![1]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::Linalg(alsvid_linalg::LinalgError::QargsOutOfRange { .. })
        ));
    }

    #[test]
    fn test_comp_chains_graphs() {
        let scope = Ambient::acquire(1).unwrap();
        let h = || scope.unit(gates::fixed("H").unwrap(), Some(vec![0])).unwrap();
        let ts = scope.comp(h(), h()).unwrap();
        assert_eq!(ts.locations().len(), 3);
        assert_eq!(ts.transitions().count(), 2);
        // lin has no in-edges, lout no out-edges.
        assert_eq!(ts.cfg().in_degree(ts.lin()), 0);
        assert_eq!(ts.cfg().out_degree(ts.lout()), 0);
    }

    #[test]
    fn test_comp_rejects_foreign_scope() {
        let two = Ambient::acquire(2).unwrap();
        let three = Ambient::acquire(3).unwrap();
        let l = two.skip().unwrap();
        let r = three.skip().unwrap();
        assert!(matches!(
            two.comp(l, r).unwrap_err(),
            IrError::NoAmbientQsize
        ));
    }

    #[test]
    fn test_case_builds_branches_and_join() {
        let scope = Ambient::acquire(2).unwrap();
        let left = scope.unit(gates::fixed("X").unwrap(), Some(vec![1])).unwrap();
        let right = scope.init(Some(vec![1])).unwrap();
        let ts = scope
            .case(
                vec![
                    (basis_projector(2, 0), left),
                    (basis_projector(2, 1), right),
                ],
                Some(vec![0]),
            )
            .unwrap();
        // lin, two branch entries, one joined exit.
        assert_eq!(ts.locations().len(), 4);
        assert_eq!(ts.transitions().count(), 4);
        assert_eq!(ts.cfg().out_degree(ts.lin()), 2);
        assert_eq!(ts.cfg().in_degree(ts.lout()), 2);
    }

    #[test]
    fn test_case_rejects_incomplete_measurements() {
        let scope = Ambient::acquire(1).unwrap();
        let only = scope.skip().unwrap();
        let err = scope
            .case(vec![(basis_projector(2, 0), only)], Some(vec![0]))
            .unwrap_err();
        assert!(matches!(err, IrError::CompletenessViolation));
    }

    #[test]
    fn test_case_rejects_mixed_dimensions() {
        let scope = Ambient::acquire(2).unwrap();
        let a = scope.skip().unwrap();
        let b = scope.skip().unwrap();
        let err = scope
            .case(
                vec![
                    (basis_projector(2, 0), a),
                    (basis_projector(4, 1), b),
                ],
                Some(vec![0]),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::IncompatibleMeasurementDims { .. }));
    }

    #[test]
    fn test_loop_shape() {
        let scope = Ambient::acquire(1).unwrap();
        let body = scope.unit(gates::fixed("H").unwrap(), Some(vec![0])).unwrap();
        let ts = scope
            .loop_(
                basis_projector(2, 1),
                basis_projector(2, 0),
                body,
                Some(vec![0]),
            )
            .unwrap();
        // Loop head (contracted), body entry, exit.
        assert_eq!(ts.locations().len(), 3);
        assert_eq!(ts.transitions().count(), 3);
        // The head carries both guards and receives the back-edge.
        assert_eq!(ts.cfg().out_degree(ts.lin()), 2);
        assert_eq!(ts.cfg().in_degree(ts.lin()), 1);
    }

    #[test]
    fn test_loop_rejects_incomplete_guards() {
        let scope = Ambient::acquire(1).unwrap();
        let body = scope.skip().unwrap();
        let err = scope
            .loop_(
                basis_projector(2, 1),
                basis_projector(2, 1),
                body,
                Some(vec![0]),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::CompletenessViolation));
    }

    #[test]
    fn test_add_outloop() {
        let scope = Ambient::acquire(1).unwrap();
        let mut ts = scope.skip().unwrap();
        ts.add_outloop().unwrap();
        assert!(ts.cfg().edge(ts.lout(), ts.lout()).is_some());
    }
}
