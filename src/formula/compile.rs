use std::collections::BTreeSet;

use log::debug;
use num_traits::ToPrimitive;
use rustc_hash::FxHashSet;

use crate::error::{ConstraintErrorKind, GenerationError, Result};
use crate::formula::eval::wrap;
use crate::formula::model::ArrayDecl;
use crate::formula::solver::SolvedFormula;
use crate::formula::term::Term;

/// A Solidity expression together with the signedness of the value it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledExpr {
    pub text: String,
    pub signed: bool,
}

impl CompiledExpr {
    fn new(text: String, signed: bool) -> Self {
        CompiledExpr { text, signed }
    }
}

/// One compiled clause of the bug-triggering formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    pub id: usize,
    pub term: Term,
    pub expression: String,
    pub indices: BTreeSet<u64>,
}

/// Returns the Solidity integer type of the given signedness and width.
pub fn solidity_type(signed: bool, width: u32) -> Result<String> {
    if width == 0 || width > 256 || width % 8 != 0 {
        return Err(GenerationError::unsupported(
            ConstraintErrorKind::Unsupported,
            format!("{}-bit integer has no Solidity type", width),
        ));
    }
    Ok(format!("{}{}", if signed { "int" } else { "uint" }, width))
}

/// Translates solver terms into Solidity expressions over `inp`.
///
/// Signedness is tracked bottom-up: array reads are signed, constants unsigned, and every
/// binary operator casts an operand whose signedness differs from the one it works in.
pub struct ExpressionCompiler<'a> {
    array: &'a ArrayDecl,
    domain_size: usize,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(array: &'a ArrayDecl, domain_size: usize) -> Self {
        ExpressionCompiler { array, domain_size }
    }

    /// Compiles a top-level clause, which has to be boolean.
    pub fn compile_clause(&self, term: &Term) -> Result<String> {
        if term.width(self.array.element_width).is_some() {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!("clause is a {} instead of a predicate", term.kind()),
            ));
        }
        Ok(self.convert(term)?.text)
    }

    pub fn convert(&self, term: &Term) -> Result<CompiledExpr> {
        match term {
            Term::Bool { value } => Ok(CompiledExpr::new(value.to_string(), false)),
            Term::Bv { value, width } => Ok(CompiledExpr::new(
                format!("{}({})", solidity_type(false, *width)?, wrap(value, *width)),
                false,
            )),
            Term::Symbol { name } => Err(GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                format!("bare symbol `{}`", name),
            )),
            Term::Select { array, index } => self.select(array, index),
            Term::Not { arg } => {
                let inner = self.convert(arg)?;
                Ok(CompiledExpr::new(format!("(!{})", inner.text), false))
            }
            Term::And { args } => self.fold(args, "&&", true),
            Term::Or { args } => self.fold(args, "||", false),
            Term::Iff { lhs, rhs } => self.iff(lhs, rhs),
            Term::Apply { func, lhs, rhs } => {
                let expr = self.binary(func.symbol(), lhs, rhs, func.forced_sign())?;
                if func.is_predicate() {
                    Ok(CompiledExpr::new(expr.text, false))
                } else {
                    Ok(expr)
                }
            }
            Term::Extend { signed, width, arg } => self.extend(*signed, *width, arg),
            Term::Extract { high, low, arg } => self.extract(*high, *low, arg),
            Term::Concat { .. } => Err(GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                term.kind(),
            )),
        }
    }

    fn width_of(&self, term: &Term) -> Result<u32> {
        term.width(self.array.element_width).ok_or_else(|| {
            GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                format!("{} used as an integer", term.kind()),
            )
        })
    }

    fn cast(&self, text: &str, term: &Term, signed: bool) -> Result<String> {
        let width = self.width_of(term)?;
        Ok(format!("{}({})", solidity_type(signed, width)?, text))
    }

    fn binary(
        &self,
        op: &str,
        lhs: &Term,
        rhs: &Term,
        forced_sign: Option<bool>,
    ) -> Result<CompiledExpr> {
        let l = self.convert(lhs)?;
        let r = self.convert(rhs)?;
        let sign = forced_sign.unwrap_or(l.signed);

        let l_text = if l.signed != sign {
            self.cast(&l.text, lhs, sign)?
        } else {
            l.text
        };
        let r_text = if r.signed != sign {
            self.cast(&r.text, rhs, sign)?
        } else {
            r.text
        };
        Ok(CompiledExpr::new(
            format!("({} {} {})", l_text, op, r_text),
            sign,
        ))
    }

    fn fold(&self, args: &[Term], op: &str, identity: bool) -> Result<CompiledExpr> {
        let mut iter = args.iter();
        let mut acc = match iter.next() {
            Some(first) => self.convert(first)?.text,
            None => return Ok(CompiledExpr::new(identity.to_string(), false)),
        };
        for arg in iter {
            acc = format!("({} {} {})", acc, op, self.convert(arg)?.text);
        }
        Ok(CompiledExpr::new(acc, false))
    }

    fn iff(&self, lhs: &Term, rhs: &Term) -> Result<CompiledExpr> {
        let element_width = self.array.element_width;
        if lhs.width(element_width).is_some() || rhs.width(element_width).is_some() {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                "iff over bit-vector operands",
            ));
        }
        let text = match (lhs, rhs) {
            (Term::Bool { value: false }, other) | (other, Term::Bool { value: false }) => {
                format!("(!{})", self.convert(other)?.text)
            }
            (Term::Bool { value: true }, other) | (other, Term::Bool { value: true }) => {
                self.convert(other)?.text
            }
            _ => format!(
                "({} == {})",
                self.convert(lhs)?.text,
                self.convert(rhs)?.text
            ),
        };
        Ok(CompiledExpr::new(text, false))
    }

    fn select(&self, array: &Term, index: &Term) -> Result<CompiledExpr> {
        let name = match array {
            Term::Symbol { name } => name,
            other => {
                return Err(GenerationError::unsupported(
                    ConstraintErrorKind::Unsupported,
                    format!("select from a {}", other.kind()),
                ))
            }
        };
        if *name != self.array.name {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::MultipleArrays,
                format!("read of array `{}` besides `{}`", name, self.array.name),
            ));
        }
        let position = match index {
            Term::Bv { value, .. } => value.to_u64(),
            other => {
                return Err(GenerationError::unsupported(
                    ConstraintErrorKind::Unsupported,
                    format!("select with a {} index", other.kind()),
                ))
            }
        };
        match position {
            Some(i) if i < self.domain_size as u64 => {
                // the fuzzed array is signed
                Ok(CompiledExpr::new(format!("inp[{}]", i), true))
            }
            _ => Err(GenerationError::unsupported(
                ConstraintErrorKind::OutOfDomain,
                format!(
                    "read of `{}` at an index beyond {}",
                    name, self.domain_size
                ),
            )),
        }
    }

    fn extend(&self, signed: bool, width: u32, arg: &Term) -> Result<CompiledExpr> {
        let from_width = self.width_of(arg)?;
        if width < from_width {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!("extension from {} to {} bits", from_width, width),
            ));
        }
        let value = self.convert(arg)?;
        let text = if value.signed != signed {
            self.cast(&value.text, arg, signed)?
        } else {
            value.text
        };
        Ok(CompiledExpr::new(
            format!("{}({})", solidity_type(signed, width)?, text),
            signed,
        ))
    }

    fn extract(&self, high: u32, low: u32, arg: &Term) -> Result<CompiledExpr> {
        let start_width = self.width_of(arg)?;
        if high < low || high >= start_width {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!("extract [{}:{}] of a {}-bit value", high, low, start_width),
            ));
        }
        let value = self.convert(arg)?;
        let text = if value.signed {
            self.cast(&value.text, arg, false)?
        } else {
            value.text
        };
        let target = solidity_type(false, high - low + 1)?;
        let text = if low == 0 {
            // truncation
            format!("{}({})", target, text)
        } else {
            let shift_l = start_width - (high + 1);
            let shift_r = shift_l + low;
            format!("{}(({} << {}) >> {})", target, text, shift_l, shift_r)
        };
        Ok(CompiledExpr::new(text, false))
    }
}

/// Compiles every clause of `formula`. Clauses compiling to an already seen expression are
/// kept once.
pub fn compile_clauses(formula: &SolvedFormula, domain_size: usize) -> Result<Vec<Clause>> {
    let compiler = ExpressionCompiler::new(&formula.array, domain_size);
    let mut seen = FxHashSet::default();
    let mut clauses = Vec::with_capacity(formula.clauses.len());

    for term in &formula.clauses {
        let expression = compiler.compile_clause(term)?;
        if !seen.insert(expression.clone()) {
            debug!("skipping duplicate clause {}", expression);
            continue;
        }
        clauses.push(Clause {
            id: clauses.len(),
            term: term.clone(),
            expression,
            indices: term.referenced_indices(),
        });
    }
    Ok(clauses)
}
