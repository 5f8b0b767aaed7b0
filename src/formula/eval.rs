use std::cmp::Ordering;

use log::debug;
use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{ConstraintErrorKind, GenerationError, Result};
use crate::formula::model::{to_signed, ArrayDecl};
use crate::formula::term::{BvOp, Term};

/// Value of a term under SMT-LIB semantics. Bit-vectors hold their unsigned bit pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Bv { bits: BigUint, width: u32 },
}

fn modulus(width: u32) -> BigUint {
    BigUint::one() << width as usize
}

/// Bit pattern of `value` truncated to `width` bits.
pub fn wrap(value: &BigInt, width: u32) -> BigUint {
    let m = BigInt::from_biguint(Sign::Plus, modulus(width));
    let reduced = ((value % &m) + &m) % &m;
    reduced.to_biguint().unwrap_or_else(BigUint::zero)
}

fn signed(bits: &BigUint, width: u32) -> BigInt {
    to_signed(&BigInt::from_biguint(Sign::Plus, bits.clone()), width)
}

fn all_ones(width: u32) -> BigUint {
    modulus(width) - BigUint::one()
}

fn bv(bits: BigUint, width: u32) -> Value {
    let bits = bits % modulus(width);
    Value::Bv { bits, width }
}

/// Result of a division or remainder whose divisor is zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroDivision {
    /// SMT-LIB totalization: all ones for quotients, the dividend for remainders.
    Total,
    /// Solidity semantics: the call reverts, `unchecked` or not.
    Revert,
}

/// Evaluates terms against one concrete input array.
pub struct Evaluator<'a> {
    array: &'a ArrayDecl,
    input: &'a [i64],
    zero_division: ZeroDivision,
}

impl<'a> Evaluator<'a> {
    pub fn new(array: &'a ArrayDecl, input: &'a [i64]) -> Self {
        Evaluator {
            array,
            input,
            zero_division: ZeroDivision::Total,
        }
    }

    /// Evaluates the way the compiled clause runs inside the generated contract.
    pub fn contract(array: &'a ArrayDecl, input: &'a [i64]) -> Self {
        Evaluator {
            array,
            input,
            zero_division: ZeroDivision::Revert,
        }
    }

    pub fn holds(&self, term: &Term) -> Result<bool> {
        match self.evaluate(term)? {
            Value::Bool(b) => Ok(b),
            Value::Bv { width, .. } => Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!("{}-bit {} used as a predicate", width, term.kind()),
            )),
        }
    }

    fn bitvector(&self, term: &Term) -> Result<(BigUint, u32)> {
        match self.evaluate(term)? {
            Value::Bv { bits, width } => Ok((bits, width)),
            Value::Bool(_) => Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!("{} used as a bit-vector", term.kind()),
            )),
        }
    }

    pub fn evaluate(&self, term: &Term) -> Result<Value> {
        match term {
            Term::Bool { value } => Ok(Value::Bool(*value)),
            Term::Bv { value, width } => Ok(Value::Bv {
                bits: wrap(value, *width),
                width: *width,
            }),
            Term::Symbol { name } => Err(GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                format!("bare symbol `{}`", name),
            )),
            Term::Select { array, index } => self.select(array, index),
            Term::Not { arg } => Ok(Value::Bool(!self.holds(arg)?)),
            Term::And { args } => {
                for arg in args {
                    if !self.holds(arg)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Term::Or { args } => {
                for arg in args {
                    if self.holds(arg)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Term::Iff { lhs, rhs } => Ok(Value::Bool(self.holds(lhs)? == self.holds(rhs)?)),
            Term::Apply { func, lhs, rhs } => self.apply(*func, lhs, rhs),
            Term::Extend { signed: sext, width, arg } => {
                let (bits, from) = self.bitvector(arg)?;
                if *sext {
                    Ok(bv(wrap(&signed(&bits, from), *width), *width))
                } else {
                    Ok(bv(bits, *width))
                }
            }
            Term::Extract { high, low, arg } => {
                let (bits, from) = self.bitvector(arg)?;
                if high < low || *high >= from {
                    return Err(GenerationError::unsupported(
                        ConstraintErrorKind::Unrecognized,
                        format!("extract [{}:{}] of a {}-bit value", high, low, from),
                    ));
                }
                Ok(bv(bits >> *low as usize, high - low + 1))
            }
            Term::Concat { lhs, rhs } => {
                let (high, high_width) = self.bitvector(lhs)?;
                let (low, low_width) = self.bitvector(rhs)?;
                Ok(bv(
                    (high << low_width as usize) | low,
                    high_width + low_width,
                ))
            }
        }
    }

    fn select(&self, array: &Term, index: &Term) -> Result<Value> {
        match array {
            Term::Symbol { name } if *name == self.array.name => {}
            other => {
                return Err(GenerationError::unsupported(
                    ConstraintErrorKind::MultipleArrays,
                    format!("read of {} besides `{}`", other.kind(), self.array.name),
                ))
            }
        }
        let (position, _) = self.bitvector(index)?;
        let value = position
            .to_usize()
            .and_then(|i| self.input.get(i))
            .ok_or_else(|| {
                GenerationError::unsupported(
                    ConstraintErrorKind::OutOfDomain,
                    format!(
                        "read at {} of an input holding {} values",
                        position,
                        self.input.len()
                    ),
                )
            })?;
        let width = self.array.element_width;
        Ok(bv(wrap(&BigInt::from(*value), width), width))
    }

    fn apply(&self, func: BvOp, lhs: &Term, rhs: &Term) -> Result<Value> {
        let (a, width) = self.bitvector(lhs)?;
        let (b, rhs_width) = self.bitvector(rhs)?;
        if width != rhs_width {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unrecognized,
                format!(
                    "`{}` over {}-bit and {}-bit operands",
                    func.symbol(),
                    width,
                    rhs_width
                ),
            ));
        }

        let divides = matches!(func, BvOp::Udiv | BvOp::Urem | BvOp::Sdiv | BvOp::Srem);
        if divides && b.is_zero() && self.zero_division == ZeroDivision::Revert {
            return Err(GenerationError::Reverted(format!(
                "`{}` by zero",
                func.symbol()
            )));
        }

        let unsigned_cmp = || a.cmp(&b);
        let signed_cmp = || signed(&a, width).cmp(&signed(&b, width));

        let value = match func {
            BvOp::Eq => Value::Bool(a == b),
            BvOp::Ult => Value::Bool(unsigned_cmp() == Ordering::Less),
            BvOp::Ule => Value::Bool(unsigned_cmp() != Ordering::Greater),
            BvOp::Ugt => Value::Bool(unsigned_cmp() == Ordering::Greater),
            BvOp::Uge => Value::Bool(unsigned_cmp() != Ordering::Less),
            BvOp::Slt => Value::Bool(signed_cmp() == Ordering::Less),
            BvOp::Sle => Value::Bool(signed_cmp() != Ordering::Greater),
            BvOp::Sgt => Value::Bool(signed_cmp() == Ordering::Greater),
            BvOp::Sge => Value::Bool(signed_cmp() != Ordering::Less),
            BvOp::Add => bv(&a + &b, width),
            BvOp::Sub => bv(&a + modulus(width) - &b, width),
            BvOp::Mul => bv(&a * &b, width),
            BvOp::Udiv => {
                if b.is_zero() {
                    bv(all_ones(width), width)
                } else {
                    bv(&a / &b, width)
                }
            }
            BvOp::Urem => {
                if b.is_zero() {
                    bv(a.clone(), width)
                } else {
                    bv(&a % &b, width)
                }
            }
            BvOp::Sdiv => {
                let (sa, sb) = (signed(&a, width), signed(&b, width));
                if sb.is_zero() {
                    if sa.sign() == Sign::Minus {
                        bv(BigUint::one(), width)
                    } else {
                        bv(all_ones(width), width)
                    }
                } else {
                    // BigInt division truncates toward zero
                    bv(wrap(&(sa / sb), width), width)
                }
            }
            BvOp::Srem => {
                let (sa, sb) = (signed(&a, width), signed(&b, width));
                if sb.is_zero() {
                    bv(a.clone(), width)
                } else {
                    bv(wrap(&(sa % sb), width), width)
                }
            }
            BvOp::And => bv(&a & &b, width),
            BvOp::Or => bv(&a | &b, width),
            BvOp::Xor => bv(&a ^ &b, width),
        };
        Ok(value)
    }
}

/// Whether `term` holds for `input` read as the array `array`.
pub fn holds(term: &Term, array: &ArrayDecl, input: &[i64]) -> Result<bool> {
    Evaluator::new(array, input).holds(term)
}

/// Whether the compiled form of `term` passes in the generated contract.
///
/// `None` when evaluating it reverts the call.
pub fn holds_in_contract(
    term: &Term,
    array: &ArrayDecl,
    input: &[i64],
) -> Result<Option<bool>> {
    match Evaluator::contract(array, input).holds(term) {
        Ok(b) => Ok(Some(b)),
        Err(GenerationError::Reverted(reason)) => {
            debug!("{}", reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
