use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ConstraintErrorKind, GenerationError, Result};
use crate::formula::model::{ArrayDecl, ArrayModel};
use crate::formula::term::Term;

/// Width of the integers accepted by the generated `step(int8[])` entry point.
pub const STEP_ELEMENT_WIDTH: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatStatus {
    Sat,
    Unsat,
    Unknown,
}

/// Output of the external SMT front-end: the flattened top-level conjunction, the declared
/// arrays and one model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverArtifact {
    pub status: SatStatus,
    pub arrays: Vec<ArrayDecl>,
    #[serde(default)]
    pub ignored_symbols: Vec<String>,
    pub clauses: Vec<Term>,
    #[serde(default)]
    pub model: Option<ArrayModel>,
}

/// A satisfiable formula over exactly one input array together with its model.
#[derive(Clone, Debug)]
pub struct SolvedFormula {
    pub array: ArrayDecl,
    pub clauses: Vec<Term>,
    pub model: ArrayModel,
}

impl SolverArtifact {
    pub fn into_solved(self) -> Result<SolvedFormula> {
        match self.status {
            SatStatus::Sat => {}
            SatStatus::Unsat => {
                return Err(GenerationError::unsupported(
                    ConstraintErrorKind::Unsatisfiable,
                    "solver reported unsat",
                ))
            }
            SatStatus::Unknown => {
                return Err(GenerationError::unsupported(
                    ConstraintErrorKind::Unsatisfiable,
                    "solver could not decide the formula",
                ))
            }
        }

        if self.arrays.len() != 1 {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::MultipleArrays,
                format!("expected one input array, found {}", self.arrays.len()),
            ));
        }
        let array = self.arrays.into_iter().next().ok_or_else(|| {
            GenerationError::unsupported(ConstraintErrorKind::MultipleArrays, "no input array")
        })?;
        if array.element_width != STEP_ELEMENT_WIDTH {
            return Err(GenerationError::unsupported(
                ConstraintErrorKind::Unsupported,
                format!(
                    "array `{}` stores {}-bit values, step inputs are int{}",
                    array.name, array.element_width, STEP_ELEMENT_WIDTH
                ),
            ));
        }

        let model = self.model.ok_or_else(|| {
            GenerationError::unsupported(
                ConstraintErrorKind::Unsatisfiable,
                "solver reported sat without a model",
            )
        })?;

        let ignored = self.ignored_symbols;
        let total = self.clauses.len();
        let clauses: Vec<Term> = self
            .clauses
            .into_iter()
            .filter(|c| !c.mentions_symbol(&ignored))
            .collect();
        if clauses.len() != total {
            debug!(
                "dropped {} clauses mentioning ignored symbols {:?}",
                total - clauses.len(),
                ignored
            );
        }

        Ok(SolvedFormula {
            array,
            clauses,
            model,
        })
    }
}

/// The seam to the external constraint solver. Solving happens once and is never retried.
pub trait ConstraintSolver {
    fn solve(&self, path: &Path) -> Result<SolvedFormula>;
}

/// Reads the JSON artifact written by the SMT front-end.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArtifactSolver;

impl ConstraintSolver for ArtifactSolver {
    fn solve(&self, path: &Path) -> Result<SolvedFormula> {
        let text = fs::read_to_string(path).map_err(|e| GenerationError::io(path, e))?;
        let artifact: SolverArtifact = serde_json::from_str(&text)?;
        info!(
            "loaded {} clauses over {} array(s) from {}",
            artifact.clauses.len(),
            artifact.arrays.len(),
            path.display()
        );
        artifact.into_solved()
    }
}
