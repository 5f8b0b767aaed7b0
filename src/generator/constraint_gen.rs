use std::collections::BTreeSet;

use log::debug;

use crate::error::{GenerationError, Result};
use crate::formula::CompiledFormula;
use crate::generator::condition::Condition;
use crate::generator::tables::{default_table, MAX_BRANCHES};
use crate::generator::{GuardPlan, Witness};
use crate::maze::{MazeGraph, SolutionPath};

/// Number of clause groups each cell receives.
///
/// Groups go to solution-path cells only, one per path cell per pass, until all of
/// `groups` are placed.
pub fn distribute(groups: usize, solution: &SolutionPath, size: usize) -> Vec<usize> {
    let mut insert = vec![0; size];
    let mut placed = 0;
    'passes: while placed < groups {
        for &cell in solution.cells() {
            insert[cell] += 1;
            placed += 1;
            if placed >= groups {
                break 'passes;
            }
        }
    }
    insert
}

pub fn derive(
    graph: &MazeGraph,
    solution: &SolutionPath,
    formula: &CompiledFormula,
) -> Result<GuardPlan> {
    let insert = distribute(formula.groups.len(), solution, graph.size());
    let mut plan = GuardPlan::empty(graph.size());
    plan.array = Some(formula.array.clone());

    let mut next_group = 0;
    for (id, successors) in graph.edges().iter().enumerate() {
        let k = successors.len();
        if insert[id] == 0 {
            let (conditions, inputs) = default_table(k)?;
            plan.assign(id, successors, conditions, inputs);
            continue;
        }
        if k > MAX_BRANCHES {
            return Err(GenerationError::InvariantViolation(format!(
                "cell {} has {} outgoing edges, at most {} are supported",
                id, k, MAX_BRANCHES
            )));
        }

        let groups = &formula.groups[next_group..next_group + insert[id]];
        next_group += insert[id];

        let mut clause_ids: Vec<usize> = groups
            .iter()
            .flat_map(|g| g.clauses.iter().copied())
            .collect();
        clause_ids.sort_unstable();
        let indices: BTreeSet<u64> = groups
            .iter()
            .flat_map(|g| g.indices.iter().copied())
            .collect();
        debug!(
            "cell {} checks clauses {:?} over indices {:?}",
            id, clause_ids, indices
        );
        plan.constraint_blocks[id] = clause_ids
            .iter()
            .map(|&c| formula.clauses[c].clone())
            .collect();
        plan.extra_declarations[id] = indices.into_iter().collect();

        let next = solution.next_of(id).ok_or_else(|| {
            GenerationError::InvariantViolation(format!(
                "cell {} received clauses but is not on the solution path",
                id
            ))
        })?;
        let flagged = successors.iter().position(|&s| s == next).ok_or_else(|| {
            GenerationError::InvariantViolation(format!("cell {} has no edge to {}", id, next))
        })?;

        let (fallback, fallback_inputs) = default_table(k - 1)?;
        let mut conditions = Vec::with_capacity(k);
        let mut m = 0;
        for (n, &succ) in successors.iter().enumerate() {
            if n == flagged {
                conditions.push(Condition::Flag(true));
                plan.witnesses.insert(id, succ, formula.witness.clone());
            } else {
                conditions.push(Condition::conjoin(
                    fallback[m].clone(),
                    Condition::Flag(false),
                ));
                plan.witnesses
                    .insert(id, succ, Witness::single(fallback_inputs[m]));
                m += 1;
            }
        }
        plan.guards[id] = conditions;
    }
    Ok(plan)
}
