//! Abstract syntax tree for the `OpenQASM` 3 dialect Alsvid lowers.
//!
//! The tree is produced by an external parser; this crate starts at the
//! statement list. Only the constructs the lowering gives semantics to
//! are modelled — everything else arrives as [`Statement::Other`].

use serde::{Deserialize, Serialize};

/// A complete program: the statement list of one compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Statements in source order.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Wrap a statement list.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A statement in the dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// Include directive (ignored by the lowering).
    Include(String),

    /// Qubit register declaration: `qubit[n] name;`
    QubitDecl { name: String, size: u32 },

    /// Classical bit register declaration: `bit[n] name;`
    BitDecl { name: String, size: u32 },

    /// Classical integer declaration: `int name;`
    IntDecl { name: String },

    /// Gate application.
    Gate(GateCall),

    /// Gate definition: `gate name q… { body }`
    GateDef {
        name: String,
        qubits: Vec<String>,
        body: Vec<Statement>,
    },

    /// Measurement: `c[i] = measure q[j];` or `c = measure q;`
    Measure { target: BitRef, qubit: QubitRef },

    /// Reset: `reset q[i];` or `reset q;`
    Reset { qubit: QubitRef },

    /// Switch over a classical register with integer-literal heads.
    Switch {
        target: String,
        cases: Vec<SwitchCase>,
    },

    /// While loop guarded by a classical comparison with a literal.
    While {
        register: String,
        op: CmpOp,
        literal: u64,
        body: Vec<Statement>,
    },

    /// Classical assignment `target = value` (identifier = identifier).
    Assign { target: String, value: String },

    /// Any statement the dialect does not model.
    Other { name: String },
}

/// A gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name (matched case-insensitively).
    pub name: String,
    /// Real-valued parameters (angles).
    pub params: Vec<Expression>,
    /// Qubit operands.
    pub operands: Vec<QubitOperand>,
}

impl GateCall {
    /// A parameter-free call.
    pub fn new(name: impl Into<String>, operands: Vec<QubitOperand>) -> Self {
        Self {
            name: name.into(),
            params: vec![],
            operands,
        }
    }

    /// Attach parameter expressions.
    pub fn with_params(mut self, params: Vec<Expression>) -> Self {
        self.params = params;
        self
    }
}

/// A qubit operand of a gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QubitOperand {
    /// An indexed register element `q[i]`.
    Register { register: String, index: u32 },
    /// A formal parameter name inside a gate definition body.
    Formal(String),
}

impl QubitOperand {
    /// Reference `register[index]`.
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        QubitOperand::Register {
            register: register.into(),
            index,
        }
    }

    /// Reference a gate-definition formal.
    pub fn formal(name: impl Into<String>) -> Self {
        QubitOperand::Formal(name.into())
    }
}

/// Reference to a qubit register or one of its elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    /// `None` refers to the whole register.
    pub index: Option<u32>,
}

impl QubitRef {
    /// Reference a single element.
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference the entire register.
    pub fn whole(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// Reference to a classical register or one of its bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    /// `None` refers to the whole register.
    pub index: Option<u32>,
}

impl BitRef {
    /// Reference a single bit.
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference the entire register.
    pub fn whole(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// One arm of a switch statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Integer-literal case head.
    pub literal: u64,
    /// Compound-statement body.
    pub body: Vec<Statement>,
}

/// Comparison operators allowed in while guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A real-valued parameter expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Named constant (`pi`).
    Identifier(String),
    /// Negation.
    Neg(Box<Expression>),
    /// Binary arithmetic.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_call_builder() {
        let call = GateCall::new("cx", vec![
            QubitOperand::indexed("q", 0),
            QubitOperand::indexed("q", 1),
        ]);
        assert_eq!(call.name, "cx");
        assert!(call.params.is_empty());
        assert_eq!(call.operands.len(), 2);
    }

    #[test]
    fn test_refs() {
        let q = QubitRef::indexed("q", 2);
        assert_eq!(q.index, Some(2));
        let c = BitRef::whole("out");
        assert_eq!(c.index, None);
    }
}
