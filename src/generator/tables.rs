//! Fixed branch tables over `inp[0]` for cells with up to four outgoing edges.
//!
//! Each table pairs the conditions of a `k`-way branch with one input per branch that
//! satisfies its own condition and none of the earlier ones.

use crate::error::{GenerationError, Result};
use crate::generator::condition::Condition;

pub const MAX_BRANCHES: usize = 4;

/// Conditions and solving inputs of one `k`-way branch.
pub type BranchTable = (Vec<Condition>, Vec<i64>);

fn too_many(k: usize) -> GenerationError {
    GenerationError::InvariantViolation(format!(
        "cell has {} outgoing edges, at most {} are supported",
        k, MAX_BRANCHES
    ))
}

/// Range splits of the signed byte `inp[0]`.
pub fn default_table(k: usize) -> Result<BranchTable> {
    use Condition::*;
    let table = match k {
        0 => (vec![], vec![]),
        1 => (vec![Literal(true)], vec![0]),
        2 => (vec![Less(0), AtLeast(0)], vec![-1, 0]),
        3 => (vec![Less(-43), Less(42), AtLeast(42)], vec![-44, 41, 42]),
        4 => (
            vec![Less(-64), Less(0), Less(64), AtLeast(64)],
            vec![-65, -1, 63, 64],
        ),
        _ => return Err(too_many(k)),
    };
    Ok(table)
}

/// Single-value matches of `inp[0]`; every branch is taken by exactly one input.
pub fn equality_table(k: usize) -> Result<BranchTable> {
    use Condition::*;
    let table = match k {
        0 => (vec![], vec![]),
        1 => (vec![Equals(1)], vec![1]),
        2 => (vec![Equals(-64), Equals(64)], vec![-64, 64]),
        3 => (vec![Equals(-85), Equals(1), Equals(87)], vec![-85, 1, 87]),
        4 => (
            vec![Equals(-96), Equals(-32), Equals(32), Equals(96)],
            vec![-96, -32, 32, 96],
        ),
        _ => return Err(too_many(k)),
    };
    Ok(table)
}
