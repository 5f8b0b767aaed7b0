use crate::error::Result;
use crate::generator::tables::default_table;
use crate::generator::GuardPlan;
use crate::maze::MazeGraph;

/// Guards every cell with the range splits of its branching degree.
pub fn derive(graph: &MazeGraph) -> Result<GuardPlan> {
    let mut plan = GuardPlan::empty(graph.size());
    for (id, successors) in graph.edges().iter().enumerate() {
        let (conditions, inputs) = default_table(successors.len())?;
        plan.assign(id, successors, conditions, inputs);
    }
    Ok(plan)
}
