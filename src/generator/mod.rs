pub mod condition;
pub mod constraint_gen;
pub mod default_gen;
pub mod equality_gen;
pub mod tables;
pub mod witness;

use std::fmt;

use log::debug;

use crate::error::{GenerationError, Result};
use crate::formula::{ArrayDecl, Clause, CompiledFormula};
use crate::maze::{Cell, MazeGraph, SolutionPath};

pub use condition::Condition;
pub use witness::{Witness, WitnessTable};

/// Everything the renderer needs to know about the branches of each cell.
#[derive(Clone, Debug)]
pub struct GuardPlan {
    /// Per cell, one condition per outgoing edge in edge order.
    pub guards: Vec<Vec<Condition>>,
    /// Per cell, the input indices read by its constraint block, ascending.
    pub extra_declarations: Vec<Vec<u64>>,
    /// Per cell, the clauses that must all hold to set the flag.
    pub constraint_blocks: Vec<Vec<Clause>>,
    /// The input array read by the constraint blocks.
    pub array: Option<ArrayDecl>,
    pub witnesses: WitnessTable,
}

impl GuardPlan {
    pub fn empty(size: usize) -> Self {
        GuardPlan {
            guards: vec![Vec::new(); size],
            extra_declarations: vec![Vec::new(); size],
            constraint_blocks: vec![Vec::new(); size],
            array: None,
            witnesses: WitnessTable::new(size),
        }
    }

    /// Installs a table-driven branch for `cell`.
    pub fn assign(
        &mut self,
        cell: usize,
        successors: &[Cell],
        conditions: Vec<Condition>,
        inputs: Vec<i64>,
    ) {
        for (next, value) in successors.iter().zip(inputs) {
            self.witnesses.insert(cell, *next, Witness::single(value));
        }
        self.guards[cell] = conditions;
    }

    /// Minimum `inp.length` accepted by the function of `cell`.
    pub fn required_length(&self, cell: usize) -> usize {
        self.extra_declarations[cell]
            .last()
            .map_or(1, |&max| (max as usize + 1).max(1))
    }

    pub fn has_constraints(&self, cell: usize) -> bool {
        !self.constraint_blocks[cell].is_empty()
    }

    /// Checks that every edge has a guard and every solution step has a witness.
    pub fn check(&self, graph: &MazeGraph, solution: &SolutionPath) -> Result<()> {
        if self.guards.len() != graph.size() {
            return Err(GenerationError::InvariantViolation(format!(
                "{} guard entries for {} cells",
                self.guards.len(),
                graph.size()
            )));
        }
        for (id, successors) in graph.edges().iter().enumerate() {
            if self.guards[id].len() != successors.len() {
                return Err(GenerationError::InvariantViolation(format!(
                    "cell {} has {} edges but {} guards",
                    id,
                    successors.len(),
                    self.guards[id].len()
                )));
            }
        }
        for (from, to) in solution.transitions() {
            if self.witnesses.get(from, to).is_none() {
                return Err(GenerationError::InvariantViolation(format!(
                    "no input takes the solution step {} -> {}",
                    from, to
                )));
            }
        }
        Ok(())
    }
}

/// How branch conditions are chosen for the cells of the maze.
#[derive(Clone, Copy, Debug)]
pub enum GuardStrategy<'a> {
    /// Range splits of `inp[0]` everywhere.
    Default,
    /// Single-value matches on roughly `percent` of the edges, range splits elsewhere.
    Equality { percent: u32, seed: u64 },
    /// The clauses of a bug-triggering formula spread over the solution path.
    Constraint(&'a CompiledFormula),
}

impl GuardStrategy<'_> {
    pub fn derive(&self, graph: &MazeGraph, solution: &SolutionPath) -> Result<GuardPlan> {
        let plan = match self {
            GuardStrategy::Default => default_gen::derive(graph)?,
            GuardStrategy::Equality { percent, seed } => {
                equality_gen::derive(graph, *percent, *seed)?
            }
            GuardStrategy::Constraint(formula) => {
                constraint_gen::derive(graph, solution, formula)?
            }
        };
        plan.check(graph, solution)?;
        debug!("derived {} guards", self);
        Ok(plan)
    }
}

impl fmt::Display for GuardStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardStrategy::Default => write!(f, "default"),
            GuardStrategy::Equality { percent, .. } => write!(f, "equality ({}%)", percent),
            GuardStrategy::Constraint(formula) => {
                write!(f, "constraint ({} groups)", formula.groups.len())
            }
        }
    }
}
