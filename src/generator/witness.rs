use std::fmt;

use rustc_hash::FxHashMap;

use crate::maze::Cell;

/// A concrete `step` input, rendered as one line of the transaction file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Witness(pub Vec<i64>);

impl Witness {
    pub fn single(value: i64) -> Self {
        Witness(vec![value])
    }

    pub fn empty() -> Self {
        Witness(Vec::new())
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "[ ]");
        }
        let values: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "[ {} ]", values.join(", "))
    }
}

/// Per cell, the input that takes each outgoing edge.
#[derive(Clone, Debug, Default)]
pub struct WitnessTable {
    entries: Vec<FxHashMap<Cell, Witness>>,
}

impl WitnessTable {
    pub fn new(size: usize) -> Self {
        WitnessTable {
            entries: vec![FxHashMap::default(); size],
        }
    }

    pub fn insert(&mut self, cell: usize, next: Cell, witness: Witness) {
        self.entries[cell].insert(next, witness);
    }

    pub fn get(&self, cell: Cell, next: Cell) -> Option<&Witness> {
        cell.index()
            .and_then(|id| self.entries.get(id))
            .and_then(|m| m.get(&next))
    }
}
