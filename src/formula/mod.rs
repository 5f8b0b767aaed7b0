pub mod compile;
pub mod eval;
pub mod grouping;
pub mod model;
pub mod solver;
pub mod term;

use log::{debug, info};

use crate::error::{GenerationError, Result};
use crate::generator::witness::Witness;

pub use compile::{compile_clauses, Clause, CompiledExpr, ExpressionCompiler};
pub use grouping::{independent_groups, ClauseGroup};
pub use model::{ArrayDecl, ArrayModel};
pub use solver::{ArtifactSolver, ConstraintSolver, SolvedFormula, SolverArtifact};
pub use term::{BvOp, Term};

/// A bug-triggering formula ready to be spread over the maze: compiled clauses, their
/// independent groups and the concrete input that satisfies all of them.
#[derive(Clone, Debug)]
pub struct CompiledFormula {
    pub array: ArrayDecl,
    pub clauses: Vec<Clause>,
    pub groups: Vec<ClauseGroup>,
    pub witness: Witness,
}

impl CompiledFormula {
    /// Compiles `solved` over a witness domain of `domain_size` array elements.
    ///
    /// Fails when the materialized model does not satisfy one of the clauses, or when a
    /// compiled clause would revert on it.
    pub fn from_solved(solved: &SolvedFormula, domain_size: usize) -> Result<Self> {
        let clauses = compile_clauses(solved, domain_size)?;
        let groups = independent_groups(&clauses);
        let witness = solved.model.materialize(solved.array.element_width, domain_size)?;

        for clause in &clauses {
            if !eval::holds(&clause.term, &solved.array, witness.values())? {
                return Err(GenerationError::InvariantViolation(format!(
                    "model does not satisfy clause {}",
                    clause.expression
                )));
            }
            let runs = eval::holds_in_contract(&clause.term, &solved.array, witness.values())?;
            if runs.is_none() {
                return Err(GenerationError::InvariantViolation(format!(
                    "model divides by zero in clause {}",
                    clause.expression
                )));
            }
        }
        if groups.iter().any(|g| g.clauses.is_empty()) {
            return Err(GenerationError::InvariantViolation(
                "empty clause group".to_string(),
            ));
        }

        for (n, group) in groups.iter().enumerate() {
            debug!(
                "group {}: clauses {:?} over indices {:?}",
                n, group.clauses, group.indices
            );
        }
        info!(
            "compiled {} clauses into {} independent groups",
            clauses.len(),
            groups.len()
        );

        Ok(CompiledFormula {
            array: solved.array.clone(),
            clauses,
            groups,
            witness,
        })
    }
}
