use std::fmt;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use crate::error::{GenerationError, Result};
use crate::maze::matrix::{Direction, MazeMatrix, SolutionPath};

/// A node of the maze graph. Every regular cell becomes one generated function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Start,
    Bug,
    Regular(usize),
}

impl Cell {
    /// The value stored in `next_cell` when the program is positioned on this cell.
    pub fn code(&self) -> i64 {
        match self {
            Cell::Regular(id) => *id as i64,
            Cell::Bug => -1,
            Cell::Start => -2,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Cell::Regular(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Regular(id) => write!(f, "{}", id),
            Cell::Bug => write!(f, "bug"),
            Cell::Start => write!(f, "start"),
        }
    }
}

/// Discovery order of every regular cell reached by one depth-first traversal.
#[derive(Clone, Debug)]
pub struct DiscoveryLabels {
    labels: Vec<Option<usize>>,
}

impl DiscoveryLabels {
    pub fn get(&self, cell: Cell) -> Option<usize> {
        cell.index().and_then(|id| self.labels.get(id).copied().flatten())
    }
}

/// Outcome of one cycle trimming pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrimReport {
    pub backedges: usize,
    pub target: usize,
    pub removed: usize,
}

/// Directed graph over maze cells. Successor order is significant: guards and
/// witnesses are parallel arrays indexed by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeGraph {
    edges: Vec<Vec<Cell>>,
}

impl MazeGraph {
    /// Connects every cell with its passable neighbours.
    ///
    /// The exit of the solution receives a synthetic edge into the bug, unless the exit is the
    /// final regular cell; in that case the maze's bottom opening below it leads to the bug.
    pub fn build(matrix: &MazeMatrix, solution: &SolutionPath) -> Result<Self> {
        let size = matrix.size();
        let last = size - 1;
        let exit = solution.exit();
        let mut edges = vec![Vec::new(); size];

        for (node, successors) in edges.iter_mut().enumerate() {
            let (row, col) = (node / matrix.width(), node % matrix.width());
            if node == exit && node != last {
                successors.push(Cell::Bug);
            }
            for dir in Direction::ALL.iter() {
                if !matrix.is_open(row, col, *dir) {
                    continue;
                }
                let target = match matrix.neighbour(row, col, *dir) {
                    Some(id) => Cell::Regular(id),
                    None if node == 0 && *dir == Direction::Up => Cell::Start,
                    None if node == last && exit == last && *dir == Direction::Down => Cell::Bug,
                    None => {
                        return Err(GenerationError::MalformedInput(format!(
                            "cell {} has an opening {:?} through the maze border",
                            node, dir
                        )))
                    }
                };
                successors.push(target);
            }
        }

        let graph = MazeGraph { edges };
        graph.validate_path(solution)?;
        debug!(
            "built maze graph with {} cells and {} edges",
            size,
            graph.count_edges()
        );
        Ok(graph)
    }

    /// Number of regular cells.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn successors(&self, id: usize) -> &[Cell] {
        &self.edges[id]
    }

    pub fn edges(&self) -> &[Vec<Cell>] {
        &self.edges
    }

    pub fn count_edges(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn has_edge(&self, from: Cell, to: Cell) -> bool {
        match from {
            Cell::Regular(id) => self.edges.get(id).map_or(false, |s| s.contains(&to)),
            _ => false,
        }
    }

    /// Checks that every step of `solution`, including the final step into the bug, is an edge.
    pub fn validate_path(&self, solution: &SolutionPath) -> Result<()> {
        for (from, to) in solution.transitions() {
            if !self.has_edge(from, to) {
                return Err(GenerationError::MalformedInput(format!(
                    "solution step {} -> {} is not a passage of the maze",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Labels cells in the order a depth-first traversal from `root` discovers them.
    ///
    /// Successors are explored in edge order, exactly as the recursive formulation would,
    /// but with an explicit stack so that large mazes cannot exhaust the call stack.
    pub fn discovery_labels(&self, root: usize) -> DiscoveryLabels {
        let mut labels = vec![None; self.size()];
        if root >= self.size() {
            return DiscoveryLabels { labels };
        }

        let mut counter = 1;
        labels[root] = Some(counter);
        let mut stack = vec![(root, 0_usize)];
        while let Some((node, child)) = stack.pop() {
            let successors = &self.edges[node];
            if child >= successors.len() {
                continue;
            }
            stack.push((node, child + 1));
            if let Cell::Regular(next) = successors[child] {
                if labels[next].is_none() {
                    counter += 1;
                    labels[next] = Some(counter);
                    stack.push((next, 0));
                }
            }
        }
        DiscoveryLabels { labels }
    }

    /// An edge is a back-edge if its source was not discovered before its destination.
    pub fn is_back_edge(labels: &DiscoveryLabels, from: Cell, to: Cell) -> bool {
        match (labels.get(from), labels.get(to)) {
            (Some(l_from), Some(l_to)) => l_from >= l_to,
            _ => false,
        }
    }

    pub fn count_backedges(&self, labels: &DiscoveryLabels) -> usize {
        self.edges
            .iter()
            .enumerate()
            .map(|(id, successors)| {
                successors
                    .iter()
                    .filter(|&&to| MazeGraph::is_back_edge(labels, Cell::Regular(id), to))
                    .count()
            })
            .sum()
    }

    /// Removes up to `n` back-edges, choosing cells at random with `seed`.
    ///
    /// Each draw removes at most one back-edge of the drawn cell; edges in `protected` are
    /// never removed. Returns the number of removed edges.
    pub fn remove_backedges(
        &mut self,
        labels: &DiscoveryLabels,
        n: usize,
        seed: u64,
        protected: &FxHashSet<(Cell, Cell)>,
    ) -> usize {
        let removable = |id: usize, to: Cell| {
            let from = Cell::Regular(id);
            MazeGraph::is_back_edge(labels, from, to) && !protected.contains(&(from, to))
        };

        let available: usize = self
            .edges
            .iter()
            .enumerate()
            .map(|(id, s)| s.iter().filter(|&&to| removable(id, to)).count())
            .sum();
        let mut remaining = n.min(available);
        let removed = remaining;

        let mut rng = StdRng::seed_from_u64(seed);
        while remaining > 0 {
            let id = rng.gen_range(0, self.size());
            if let Some(pos) = self.edges[id].iter().position(|&to| removable(id, to)) {
                self.edges[id].remove(pos);
                remaining -= 1;
            }
        }
        removed
    }

    /// Thins the cycles of the maze so that roughly `keep_percent` of them remain.
    ///
    /// Back-edges are classified by one traversal from cell 0; edges used by the solution
    /// are excluded from removal since a back-edge can lie on the solution path whenever the
    /// traversal reaches a path cell through a cycle first.
    pub fn trim_cycles(
        &mut self,
        keep_percent: u32,
        seed: u64,
        solution: &SolutionPath,
    ) -> Result<TrimReport> {
        if keep_percent > 100 {
            return Err(GenerationError::Configuration(format!(
                "cycle percentage must be within [0, 100] (got {})",
                keep_percent
            )));
        }

        let labels = self.discovery_labels(0);
        let backedges = self.count_backedges(&labels);
        let proportion = 1.0 - f64::from(keep_percent) / 100.0;
        let target = (backedges as f64 * proportion).round() as usize;

        let protected: FxHashSet<(Cell, Cell)> = solution.transitions().into_iter().collect();
        let removed = self.remove_backedges(&labels, target, seed, &protected);
        if removed < target {
            warn!(
                "only {} of {} back-edges could be removed without cutting the solution path",
                removed, target
            );
        }

        for (from, to) in solution.transitions() {
            if !self.has_edge(from, to) {
                return Err(GenerationError::InvariantViolation(format!(
                    "cycle trimming removed solution step {} -> {}",
                    from, to
                )));
            }
        }

        debug!(
            "cycle trimming: {} back-edges, target {}, removed {}",
            backedges, target, removed
        );
        Ok(TrimReport {
            backedges,
            target,
            removed,
        })
    }
}
