use std::collections::BTreeMap;

use num_bigint_dig::BigInt;
use num_traits::{One, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::error::{ConstraintErrorKind, GenerationError, Result};
use crate::generator::witness::Witness;

/// The designated input array every clause reads from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayDecl {
    pub name: String,
    pub index_width: u32,
    pub element_width: u32,
}

/// Satisfying assignment of the input array: a default value plus sparse overrides.
///
/// Values are the raw (unsigned) bit patterns reported by the solver.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayModel {
    #[serde_as(as = "DisplayFromStr")]
    pub default: BigInt,
    #[serde_as(as = "BTreeMap<DisplayFromStr, DisplayFromStr>")]
    #[serde(default)]
    pub overrides: BTreeMap<u64, BigInt>,
}

impl ArrayModel {
    pub fn value_at(&self, index: u64) -> &BigInt {
        self.overrides.get(&index).unwrap_or(&self.default)
    }

    /// Concrete array over `[0, domain_size)`: overrides first, the default elsewhere.
    ///
    /// Elements are reinterpreted as two's-complement values of `element_width` bits since
    /// the generated `step` function receives signed integers.
    pub fn materialize(&self, element_width: u32, domain_size: usize) -> Result<Witness> {
        let mut values = Vec::with_capacity(domain_size);
        for index in 0..domain_size as u64 {
            let raw = self.value_at(index);
            let value = to_signed(raw, element_width).to_i64().ok_or_else(|| {
                GenerationError::unsupported(
                    ConstraintErrorKind::Unsupported,
                    format!("model value {} does not fit a step input", raw),
                )
            })?;
            values.push(value);
        }
        Ok(Witness(values))
    }
}

/// Reduces `value` modulo `2^width` and reads the result as a signed number.
pub fn to_signed(value: &BigInt, width: u32) -> BigInt {
    if width == 0 {
        return BigInt::from(0);
    }
    let modulus = BigInt::one() << width as usize;
    let half = BigInt::one() << (width - 1) as usize;
    let reduced = ((value % &modulus) + &modulus) % &modulus;
    if reduced >= half {
        reduced - modulus
    } else {
        reduced
    }
}
