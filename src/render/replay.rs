use log::debug;

use crate::error::{GenerationError, Result};
use crate::formula::eval;
use crate::generator::{GuardPlan, Witness};
use crate::maze::{Cell, MazeGraph, SolutionPath};

/// State of the contract after replaying a transaction sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub position: Cell,
    pub bug: bool,
    pub stop: bool,
    /// Number of steps that did not revert.
    pub accepted: usize,
    /// First reverted step, replay ends there.
    pub rejected: Option<usize>,
}

impl ReplayOutcome {
    /// True when the bug was reached and every one of `steps` was accepted.
    pub fn reached_bug(&self, steps: usize) -> bool {
        self.bug && self.rejected.is_none() && self.accepted == steps
    }
}

/// Flag computed by the cell's constraint block, `None` when the block reverts.
fn cell_flag(plan: &GuardPlan, id: usize, input: &[i64]) -> Result<Option<bool>> {
    let clauses = &plan.constraint_blocks[id];
    if clauses.is_empty() {
        return Ok(Some(false));
    }
    let array = plan.array.as_ref().ok_or_else(|| {
        GenerationError::InvariantViolation(format!(
            "cell {} checks clauses without an input array",
            id
        ))
    })?;
    // nested ifs: later clauses run only when earlier ones hold
    for clause in clauses {
        match eval::holds_in_contract(&clause.term, array, input)? {
            Some(true) => {}
            other => return Ok(other),
        }
    }
    Ok(Some(true))
}

/// Runs `transactions` through the branch model of the generated contract.
///
/// A step reverts when the contract already stopped or already hit the bug, when the input
/// is shorter than the current cell requires, or when a clause divides by zero.
pub fn replay(
    graph: &MazeGraph,
    solution: &SolutionPath,
    plan: &GuardPlan,
    transactions: &[Witness],
) -> Result<ReplayOutcome> {
    let mut state = ReplayOutcome {
        position: Cell::Regular(solution.entry()),
        bug: false,
        stop: false,
        accepted: 0,
        rejected: None,
    };

    for (step, witness) in transactions.iter().enumerate() {
        if state.stop || state.bug {
            state.rejected = Some(step);
            break;
        }
        let input = witness.values();
        match state.position {
            Cell::Start => {}
            Cell::Bug => state.bug = true,
            Cell::Regular(id) => {
                if input.len() < plan.required_length(id) {
                    state.rejected = Some(step);
                    break;
                }
                let flag = match cell_flag(plan, id, input)? {
                    Some(flag) => flag,
                    None => {
                        state.rejected = Some(step);
                        break;
                    }
                };
                let taken = graph
                    .successors(id)
                    .iter()
                    .zip(&plan.guards[id])
                    .find(|(_, condition)| condition.holds(input, flag));
                match taken {
                    Some((next, _)) => state.position = *next,
                    None => state.stop = true,
                }
            }
        }
        state.accepted += 1;
    }

    debug!("replay ended at {} after {} steps", state.position, state.accepted);
    Ok(state)
}
