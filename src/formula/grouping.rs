use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::formula::compile::Clause;

/// Clauses transitively connected through the input indices they read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseGroup {
    /// Positions into the clause list, ascending.
    pub clauses: Vec<usize>,
    /// Union of the indices read by the member clauses.
    pub indices: BTreeSet<u64>,
}

/// Splits `clauses` into independent groups.
///
/// Two clauses are related when their index sets intersect; the groups are the connected
/// components of that relation, ordered by their first clause. A clause that reads no index
/// forms a group of its own.
pub fn independent_groups(clauses: &[Clause]) -> Vec<ClauseGroup> {
    let mut by_index: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for (pos, clause) in clauses.iter().enumerate() {
        for index in &clause.indices {
            by_index.entry(*index).or_default().push(pos);
        }
    }

    let mut assigned = vec![false; clauses.len()];
    let mut groups = Vec::new();

    for start in 0..clauses.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;

        let mut members = vec![start];
        let mut indices = BTreeSet::new();
        let mut worklist = vec![start];
        while let Some(pos) = worklist.pop() {
            for index in &clauses[pos].indices {
                if !indices.insert(*index) {
                    continue;
                }
                for &other in by_index.get(index).map(Vec::as_slice).unwrap_or(&[]) {
                    if !assigned[other] {
                        assigned[other] = true;
                        members.push(other);
                        worklist.push(other);
                    }
                }
            }
        }

        members.sort_unstable();
        groups.push(ClauseGroup {
            clauses: members,
            indices,
        });
    }
    groups
}
