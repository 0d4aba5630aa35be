//! AST-to-SVTS lowering.
//!
//! A single left-to-right fold over the statement list. Statements that
//! carry no quantum transition (declarations, measurements, classical
//! assignments) only update the lowering environments; everything else
//! produces an SVTS fragment that is composed sequentially onto the
//! accumulator.

use rustc_hash::FxHashMap;
use tracing::{instrument, warn};

use alsvid_ir::{Ambient, Svts};
use alsvid_linalg::matrix::{CMat, basis_projector, basis_projector_sum};
use alsvid_linalg::{SuperOp, expand, gates};

use crate::ast::{
    BinOp, BitRef, CmpOp, Expression, GateCall, Program, QubitOperand, QubitRef, Statement,
    SwitchCase,
};
use crate::error::{LowerError, LowerResult};

/// Lower a program to its SVTS.
///
/// Counts the declared qubits, acquires the ambient scope and folds the
/// statement list. A program that declares no qubits has no ambient
/// system and is rejected.
#[instrument(skip(program), fields(statements = program.statements.len()))]
pub fn lower(program: &Program) -> LowerResult<Svts> {
    let qsize = count_qubits(&program.statements);
    let ambient = Ambient::acquire(qsize)?;
    let mut lowerer = Lowerer::new(&ambient);
    lowerer.run(&program.statements)
}

/// Total number of qubits declared at the top level.
pub fn count_qubits(statements: &[Statement]) -> usize {
    statements
        .iter()
        .map(|stmt| match stmt {
            Statement::QubitDecl { size, .. } => *size as usize,
            _ => 0,
        })
        .sum()
}

/// Contents of a classical register: measurement slots, or an alias of
/// another register installed by classical assignment. Aliases are
/// resolved on every access, so a later measurement through the aliased
/// name is visible to both.
#[derive(Debug, Clone)]
enum CregEntry {
    Slots(Vec<Option<usize>>),
    Alias(String),
}

/// Lowers a statement list to an SVTS inside one ambient scope.
pub struct Lowerer<'a> {
    ambient: &'a Ambient,
    /// Next qubit index to hand out.
    next_qubit: usize,
    /// Qubit registers: name -> ordered qubit indices.
    qregs: FxHashMap<String, Vec<usize>>,
    /// Classical registers: name -> slots or alias.
    cregs: FxHashMap<String, CregEntry>,
    /// Gate table: uppercased name -> unitary. Fixed built-ins are
    /// copied in lazily; user definitions are stored by `gate`.
    gates: FxHashMap<String, CMat>,
    /// Formal qubit names while lowering a gate-definition body.
    params: Vec<String>,
}

impl<'a> Lowerer<'a> {
    /// Create a lowerer for the given scope.
    pub fn new(ambient: &'a Ambient) -> Self {
        Self {
            ambient,
            next_qubit: 0,
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            gates: FxHashMap::default(),
            params: vec![],
        }
    }

    /// Qubit registers resolved so far.
    pub fn qregs(&self) -> &FxHashMap<String, Vec<usize>> {
        &self.qregs
    }

    /// The gate table accumulated so far.
    pub fn gates(&self) -> &FxHashMap<String, CMat> {
        &self.gates
    }

    /// Fold a full statement list. A program with no proper transition
    /// lowers to a single `skip`.
    pub fn run(&mut self, statements: &[Statement]) -> LowerResult<Svts> {
        match self.lower_block(statements)? {
            Some(ts) => Ok(ts),
            None => Ok(self.ambient.skip()?),
        }
    }

    fn lower_block(&mut self, statements: &[Statement]) -> LowerResult<Option<Svts>> {
        let mut acc: Option<Svts> = None;
        for stmt in statements {
            let Some(next) = self.lower_statement(stmt)? else {
                continue;
            };
            acc = Some(match acc {
                None => next,
                Some(ts) => self.ambient.comp(ts, next)?,
            });
        }
        Ok(acc)
    }

    fn lower_statement(&mut self, stmt: &Statement) -> LowerResult<Option<Svts>> {
        match stmt {
            Statement::Include(_) => Ok(None),

            Statement::QubitDecl { name, size } => {
                let indices: Vec<usize> =
                    (self.next_qubit..self.next_qubit + *size as usize).collect();
                self.next_qubit += *size as usize;
                self.qregs.insert(name.clone(), indices);
                Ok(None)
            }

            Statement::BitDecl { name, size } => {
                self.cregs
                    .insert(name.clone(), CregEntry::Slots(vec![None; *size as usize]));
                Ok(None)
            }

            Statement::IntDecl { name } => {
                self.cregs.insert(name.clone(), CregEntry::Slots(vec![]));
                Ok(None)
            }

            Statement::Assign { target, value } => {
                if !self.cregs.contains_key(value) {
                    return Err(LowerError::UndefinedIdentifier(value.clone()));
                }
                self.cregs
                    .insert(target.clone(), CregEntry::Alias(value.clone()));
                Ok(None)
            }

            Statement::Measure { target, qubit } => {
                self.lower_measure(target, qubit)?;
                Ok(None)
            }

            Statement::Gate(call) => Ok(Some(self.lower_gate_call(call)?)),

            Statement::GateDef { name, qubits, body } => {
                self.lower_gate_def(name, qubits, body)?;
                Ok(None)
            }

            Statement::Reset { qubit } => {
                let qargs = self.resolve_qubits(qubit)?;
                Ok(Some(self.ambient.init(Some(qargs))?))
            }

            Statement::Switch { target, cases } => Ok(Some(self.lower_switch(target, cases)?)),

            Statement::While {
                register,
                op,
                literal,
                body,
            } => Ok(Some(self.lower_while(register, *op, *literal, body)?)),

            Statement::Other { name } => {
                warn!(statement = %name, "ignoring unsupported statement");
                Ok(None)
            }
        }
    }

    fn lower_gate_call(&mut self, call: &GateCall) -> LowerResult<Svts> {
        let (op, qargs) = self.resolve_gate_call(call)?;
        Ok(self.ambient.unit(op, Some(qargs))?)
    }

    /// Resolve a call to its unitary and qubit arguments.
    fn resolve_gate_call(&mut self, call: &GateCall) -> LowerResult<(CMat, Vec<usize>)> {
        let name = call.name.to_uppercase();
        let op = if call.params.is_empty() {
            match self.gates.get(&name).cloned() {
                Some(m) => m,
                None => {
                    let m = gates::fixed(&name)
                        .ok_or_else(|| LowerError::UnknownGate(name.clone()))?;
                    self.gates.insert(name, m.clone());
                    m
                }
            }
        } else {
            // Parameterised families are materialised per call from the
            // evaluated literal arguments, never cached by bare name.
            let args = call
                .params
                .iter()
                .map(eval_expr)
                .collect::<LowerResult<Vec<f64>>>()?;
            gates::parametric(&name, &args).ok_or(LowerError::UnknownGate(name))?
        };
        let qargs = call
            .operands
            .iter()
            .map(|operand| self.resolve_operand(operand))
            .collect::<LowerResult<Vec<usize>>>()?;
        Ok((op, qargs))
    }

    fn resolve_operand(&self, operand: &QubitOperand) -> LowerResult<usize> {
        match operand {
            QubitOperand::Formal(name) => self
                .params
                .iter()
                .position(|p| p == name)
                .ok_or_else(|| LowerError::UndefinedIdentifier(name.clone())),
            QubitOperand::Register { register, index } => {
                let qubits = self
                    .qregs
                    .get(register)
                    .ok_or_else(|| LowerError::UndefinedIdentifier(register.clone()))?;
                qubits
                    .get(*index as usize)
                    .copied()
                    .ok_or_else(|| LowerError::IndexOutOfBounds {
                        register: register.clone(),
                        index: *index as usize,
                        size: qubits.len(),
                    })
            }
        }
    }

    fn resolve_qubits(&self, qubit: &QubitRef) -> LowerResult<Vec<usize>> {
        let qubits = self
            .qregs
            .get(&qubit.register)
            .ok_or_else(|| LowerError::UndefinedIdentifier(qubit.register.clone()))?;
        match qubit.index {
            Some(i) => qubits
                .get(i as usize)
                .map(|&q| vec![q])
                .ok_or_else(|| LowerError::IndexOutOfBounds {
                    register: qubit.register.clone(),
                    index: i as usize,
                    size: qubits.len(),
                }),
            None => Ok(qubits.clone()),
        }
    }

    /// Lower a gate definition: the body is lowered in a fresh inner
    /// scope sized by the formals, each edge expanded onto that scope
    /// and composed in order; the compound unitary lands in the table.
    fn lower_gate_def(
        &mut self,
        name: &str,
        formals: &[String],
        body: &[Statement],
    ) -> LowerResult<()> {
        let inner = Ambient::acquire(formals.len())?;
        self.params = formals.to_vec();
        let result = (|| {
            let mut compound = SuperOp::identity_on((0..formals.len()).collect())?;
            for stmt in body {
                let Statement::Gate(call) = stmt else {
                    return Err(LowerError::UnsupportedInGateBody);
                };
                let (op, qargs) = self.resolve_gate_call(call)?;
                let sub = inner.unit(op, Some(qargs))?;
                let (_, _, edge) = sub
                    .transitions()
                    .next()
                    .expect("unitary transition has one edge");
                let widened = expand(edge, formals.len())?;
                compound = compound.then(&widened)?;
            }
            Ok(compound)
        })();
        self.params.clear();

        let compound = result?;
        self.gates
            .insert(name.to_uppercase(), compound.kraus()[0].clone());
        Ok(())
    }

    fn lower_measure(&mut self, target: &BitRef, qubit: &QubitRef) -> LowerResult<()> {
        let sources = self.resolve_qubits(qubit)?;
        let owner = self.creg_owner(&target.register)?;
        let Some(CregEntry::Slots(slots)) = self.cregs.get_mut(&owner) else {
            return Err(LowerError::UndefinedIdentifier(owner));
        };
        match target.index {
            Some(i) => {
                if sources.len() != 1 {
                    return Err(LowerError::MeasurementWidthMismatch {
                        target: target.register.clone(),
                        source_register: qubit.register.clone(),
                    });
                }
                let i = i as usize;
                if i >= slots.len() {
                    return Err(LowerError::IndexOutOfBounds {
                        register: target.register.clone(),
                        index: i,
                        size: slots.len(),
                    });
                }
                slots[i] = Some(sources[0]);
            }
            None => {
                if sources.len() != slots.len() {
                    return Err(LowerError::MeasurementWidthMismatch {
                        target: target.register.clone(),
                        source_register: qubit.register.clone(),
                    });
                }
                for (slot, q) in slots.iter_mut().zip(sources) {
                    *slot = Some(q);
                }
            }
        }
        Ok(())
    }

    fn lower_switch(&mut self, target: &str, cases: &[SwitchCase]) -> LowerResult<Svts> {
        let qargs = self.creg_qubits(target)?;
        let dim = 1usize << qargs.len();
        let mut branches = Vec::with_capacity(cases.len());
        for case in cases {
            if case.literal >= dim as u64 {
                return Err(LowerError::LiteralOutOfRange {
                    value: case.literal,
                    bits: qargs.len(),
                });
            }
            let head = basis_projector(dim, case.literal as usize);
            let sub = match self.lower_block(&case.body)? {
                Some(ts) => ts,
                None => self.ambient.skip()?,
            };
            branches.push((head, sub));
        }
        Ok(self.ambient.case(branches, Some(qargs))?)
    }

    fn lower_while(
        &mut self,
        register: &str,
        op: CmpOp,
        literal: u64,
        body: &[Statement],
    ) -> LowerResult<Svts> {
        let qargs = self.creg_qubits(register)?;
        let dim = 1usize << qargs.len();
        if literal >= dim as u64 {
            return Err(LowerError::LiteralOutOfRange {
                value: literal,
                bits: qargs.len(),
            });
        }
        let v = literal as usize;

        // Guard reduction over the per-basis-index projectors, with the
        // literal read as the big-endian integer of the full register.
        let (t_op, f_op) = match op {
            CmpOp::Eq => (
                basis_projector(dim, v),
                basis_projector_sum(dim, (0..dim).filter(|&i| i != v)),
            ),
            CmpOp::NotEq => (
                basis_projector_sum(dim, (0..dim).filter(|&i| i != v)),
                basis_projector(dim, v),
            ),
            CmpOp::Lt => (
                basis_projector_sum(dim, 0..v),
                basis_projector_sum(dim, v..dim),
            ),
            CmpOp::LtEq => (
                basis_projector_sum(dim, 0..=v),
                basis_projector_sum(dim, v + 1..dim),
            ),
            CmpOp::Gt => (
                basis_projector_sum(dim, v + 1..dim),
                basis_projector_sum(dim, 0..=v),
            ),
            CmpOp::GtEq => (
                basis_projector_sum(dim, v..dim),
                basis_projector_sum(dim, 0..v),
            ),
        };

        let body_ts = match self.lower_block(body)? {
            Some(ts) => ts,
            None => self.ambient.skip()?,
        };
        Ok(self.ambient.loop_(t_op, f_op, body_ts, Some(qargs))?)
    }

    /// Resolve a classical register name through alias entries to the
    /// register that owns the slots.
    fn creg_owner(&self, name: &str) -> LowerResult<String> {
        let mut current = name;
        for _ in 0..=self.cregs.len() {
            match self.cregs.get(current) {
                None => return Err(LowerError::UndefinedIdentifier(current.to_string())),
                Some(CregEntry::Alias(next)) => current = next,
                Some(CregEntry::Slots(_)) => return Ok(current.to_string()),
            }
        }
        Err(LowerError::UndefinedIdentifier(name.to_string()))
    }

    /// The qubit indices measured into a classical register, in slot
    /// order. Every slot must have been written by a measurement.
    fn creg_qubits(&self, name: &str) -> LowerResult<Vec<usize>> {
        let owner = self.creg_owner(name)?;
        let Some(CregEntry::Slots(slots)) = self.cregs.get(&owner) else {
            return Err(LowerError::UndefinedIdentifier(owner));
        };
        slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| LowerError::UnassignedBit {
                    register: owner.clone(),
                    index,
                })
            })
            .collect()
    }
}

/// Evaluate a parameter expression to a real value.
///
/// Only literals, negation, the four arithmetic operators and the `pi`
/// constant are accepted; anything else fails hard.
fn eval_expr(expr: &Expression) -> LowerResult<f64> {
    Ok(match expr {
        Expression::Int(v) => *v as f64,
        Expression::Float(v) => *v,
        Expression::Identifier(name) => match name.to_uppercase().as_str() {
            "PI" => std::f64::consts::PI,
            _ => {
                return Err(LowerError::UnsupportedExpression(format!(
                    "unknown constant '{name}'"
                )));
            }
        },
        Expression::Neg(inner) => -eval_expr(inner)?,
        Expression::BinOp { left, op, right } => {
            let l = eval_expr(left)?;
            let r = eval_expr(right)?;
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expression as E;

    #[test]
    fn test_eval_literals() {
        assert_eq!(eval_expr(&E::Int(3)).unwrap(), 3.0);
        assert_eq!(eval_expr(&E::Float(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn test_eval_pi_case_insensitive() {
        let pi = eval_expr(&E::Identifier("pi".into())).unwrap();
        assert!((pi - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_eval_arithmetic() {
        // -pi / 2 + 1
        let expr = E::BinOp {
            left: Box::new(E::BinOp {
                left: Box::new(E::Neg(Box::new(E::Identifier("pi".into())))),
                op: BinOp::Div,
                right: Box::new(E::Int(2)),
            }),
            op: BinOp::Add,
            right: Box::new(E::Int(1)),
        };
        let v = eval_expr(&expr).unwrap();
        assert!((v - (-std::f64::consts::FRAC_PI_2 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_eval_rejects_unknown_identifier() {
        assert!(matches!(
            eval_expr(&E::Identifier("tau".into())).unwrap_err(),
            LowerError::UnsupportedExpression(_)
        ));
    }

    #[test]
    fn test_count_qubits_top_level_only() {
        let statements = vec![
            Statement::QubitDecl {
                name: "q".into(),
                size: 2,
            },
            Statement::QubitDecl {
                name: "r".into(),
                size: 1,
            },
            Statement::BitDecl {
                name: "c".into(),
                size: 4,
            },
        ];
        assert_eq!(count_qubits(&statements), 3);
    }
}
