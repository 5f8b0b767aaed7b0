use std::collections::BTreeSet;

use num_bigint_dig::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Binary bit-vector operators appearing in solver clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BvOp {
    Eq,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
    Add,
    Sub,
    Mul,
    Udiv,
    Sdiv,
    Urem,
    Srem,
    And,
    Or,
    Xor,
}

impl BvOp {
    /// Solidity spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BvOp::Eq => "==",
            BvOp::Ult | BvOp::Slt => "<",
            BvOp::Ule | BvOp::Sle => "<=",
            BvOp::Ugt | BvOp::Sgt => ">",
            BvOp::Uge | BvOp::Sge => ">=",
            BvOp::Add => "+",
            BvOp::Sub => "-",
            BvOp::Mul => "*",
            BvOp::Udiv | BvOp::Sdiv => "/",
            BvOp::Urem | BvOp::Srem => "%",
            BvOp::And => "&",
            BvOp::Or => "|",
            BvOp::Xor => "^",
        }
    }

    /// Signedness the operator imposes on both operands; `None` follows the left operand.
    pub fn forced_sign(&self) -> Option<bool> {
        match self {
            BvOp::Slt | BvOp::Sle | BvOp::Sgt | BvOp::Sge | BvOp::Sdiv | BvOp::Srem => Some(true),
            BvOp::Ult | BvOp::Ule | BvOp::Ugt | BvOp::Uge | BvOp::Udiv | BvOp::Urem => {
                Some(false)
            }
            _ => None,
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            BvOp::Eq
                | BvOp::Ult
                | BvOp::Ule
                | BvOp::Ugt
                | BvOp::Uge
                | BvOp::Slt
                | BvOp::Sle
                | BvOp::Sgt
                | BvOp::Sge
        )
    }
}

/// One node of a clause as handed over by the external SMT front-end.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Term {
    Bool {
        value: bool,
    },
    Bv {
        #[serde_as(as = "DisplayFromStr")]
        value: BigInt,
        width: u32,
    },
    Symbol {
        name: String,
    },
    Select {
        array: Box<Term>,
        index: Box<Term>,
    },
    Not {
        arg: Box<Term>,
    },
    And {
        args: Vec<Term>,
    },
    Or {
        args: Vec<Term>,
    },
    Iff {
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
    Apply {
        func: BvOp,
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
    /// Sign (`signed`) or zero extension to `width` bits.
    Extend {
        signed: bool,
        width: u32,
        arg: Box<Term>,
    },
    Extract {
        high: u32,
        low: u32,
        arg: Box<Term>,
    },
    Concat {
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
}

impl Term {
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Bool { .. } => "bool constant",
            Term::Bv { .. } => "bit-vector constant",
            Term::Symbol { .. } => "symbol",
            Term::Select { .. } => "select",
            Term::Not { .. } => "not",
            Term::And { .. } => "and",
            Term::Or { .. } => "or",
            Term::Iff { .. } => "iff",
            Term::Apply { .. } => "bit-vector operation",
            Term::Extend { signed: true, .. } => "sign extension",
            Term::Extend { signed: false, .. } => "zero extension",
            Term::Extract { .. } => "extract",
            Term::Concat { .. } => "concat",
        }
    }

    /// Bit width of a bit-vector valued term, `None` for boolean terms.
    ///
    /// `element_width` is the width of the values stored in the input array.
    pub fn width(&self, element_width: u32) -> Option<u32> {
        match self {
            Term::Bv { width, .. } => Some(*width),
            Term::Select { .. } => Some(element_width),
            Term::Apply { func, lhs, .. } if !func.is_predicate() => lhs.width(element_width),
            Term::Extend { width, .. } => Some(*width),
            Term::Extract { high, low, .. } => Some(high.saturating_sub(*low) + 1),
            Term::Concat { lhs, rhs } => {
                Some(lhs.width(element_width)? + rhs.width(element_width)?)
            }
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<&Term> {
        match self {
            Term::Bool { .. } | Term::Bv { .. } | Term::Symbol { .. } => Vec::new(),
            Term::Select { array, index } => vec![array.as_ref(), index.as_ref()],
            Term::Not { arg } | Term::Extend { arg, .. } | Term::Extract { arg, .. } => {
                vec![arg.as_ref()]
            }
            Term::And { args } | Term::Or { args } => args.iter().collect(),
            Term::Iff { lhs, rhs } | Term::Apply { lhs, rhs, .. } | Term::Concat { lhs, rhs } => {
                vec![lhs.as_ref(), rhs.as_ref()]
            }
        }
    }

    /// Constant indices read from any array inside this term.
    pub fn referenced_indices(&self) -> BTreeSet<u64> {
        let mut indices = BTreeSet::new();
        let mut worklist = vec![self];
        while let Some(term) = worklist.pop() {
            if let Term::Select { index, .. } = term {
                if let Term::Bv { value, .. } = index.as_ref() {
                    if let Some(i) = value.to_u64() {
                        indices.insert(i);
                    }
                }
            }
            worklist.extend(term.children());
        }
        indices
    }

    pub fn mentions_symbol(&self, names: &[String]) -> bool {
        let mut worklist = vec![self];
        while let Some(term) = worklist.pop() {
            if let Term::Symbol { name } = term {
                if names.iter().any(|n| n == name) {
                    return true;
                }
            }
            worklist.extend(term.children());
        }
        false
    }
}

/// Convenience constructors used when assembling clauses by hand.
pub mod build {
    use super::*;

    pub fn bv(value: i64, width: u32) -> Term {
        Term::Bv {
            value: BigInt::from(value),
            width,
        }
    }

    pub fn select(array: &str, index: u64) -> Term {
        Term::Select {
            array: Box::new(Term::Symbol {
                name: array.to_string(),
            }),
            index: Box::new(Term::Bv {
                value: BigInt::from(index),
                width: 32,
            }),
        }
    }

    pub fn apply(func: BvOp, lhs: Term, rhs: Term) -> Term {
        Term::Apply {
            func,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn not(arg: Term) -> Term {
        Term::Not { arg: Box::new(arg) }
    }

    pub fn extend(signed: bool, width: u32, arg: Term) -> Term {
        Term::Extend {
            signed,
            width,
            arg: Box::new(arg),
        }
    }

    pub fn extract(high: u32, low: u32, arg: Term) -> Term {
        Term::Extract {
            high,
            low,
            arg: Box::new(arg),
        }
    }
}
