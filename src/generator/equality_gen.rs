use std::collections::BTreeSet;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GenerationError, Result};
use crate::generator::tables::{default_table, equality_table};
use crate::generator::GuardPlan;
use crate::maze::MazeGraph;

/// Picks the cells whose branches become equality matches.
///
/// Cells are drawn at random until their edges cover `floor(total * percent / 100)` edges,
/// or until every cell has been drawn.
///
/// # Arguments
///
/// * `graph` - The trimmed maze graph.
/// * `percent` - Share of edges to convert, within `[0, 100]`.
/// * `seed` - Seed of the drawing.
///
/// # Returns
///
/// The chosen cell ids.
pub fn select_cells(graph: &MazeGraph, percent: u32, seed: u64) -> Result<BTreeSet<usize>> {
    if percent > 100 {
        return Err(GenerationError::Configuration(format!(
            "equality percentage must be within [0, 100] (got {})",
            percent
        )));
    }

    let total = graph.count_edges();
    let target = total * percent as usize / 100;
    let mut chosen = BTreeSet::new();
    let mut covered = 0;

    let mut rng = StdRng::seed_from_u64(seed);
    while covered < target && chosen.len() < graph.size() {
        let id = rng.gen_range(0, graph.size());
        if chosen.insert(id) {
            covered += graph.successors(id).len();
        }
    }

    debug!(
        "equality guards on {} cells covering {} of {} edges (target {})",
        chosen.len(),
        covered,
        total,
        target
    );
    Ok(chosen)
}

pub fn derive(graph: &MazeGraph, percent: u32, seed: u64) -> Result<GuardPlan> {
    let chosen = select_cells(graph, percent, seed)?;
    let mut plan = GuardPlan::empty(graph.size());
    for (id, successors) in graph.edges().iter().enumerate() {
        let (conditions, inputs) = if chosen.contains(&id) {
            equality_table(successors.len())?
        } else {
            default_table(successors.len())?
        };
        plan.assign(id, successors, conditions, inputs);
    }
    Ok(plan)
}
