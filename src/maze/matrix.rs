use std::fs;
use std::path::Path;

use crate::error::{GenerationError, Result};
use crate::maze::graph::Cell;

/// Wall openings of a cell, in the order successors are attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];
}

/// A parsed maze: `(2 * height + 1)` rows of `(2 * width + 1)` passable/blocked entries.
///
/// Cell `(r, c)` is located at matrix position `(2r + 1, 2c + 1)`; the entries between two
/// cells tell whether the wall separating them is open.
#[derive(Clone, Debug)]
pub struct MazeMatrix {
    width: usize,
    height: usize,
    rows: Vec<Vec<bool>>,
}

impl MazeMatrix {
    /// Parses the textual maze produced by the maze generator.
    ///
    /// `0` marks a passable entry and `1` a wall. Spaces, commas and square brackets are
    /// ignored so that both the raw and the list-printed matrix formats are accepted.
    pub fn parse(text: &str, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GenerationError::Configuration(format!(
                "maze dimensions must be positive (got {}x{})",
                width, height
            )));
        }

        let mut rows = Vec::with_capacity(2 * height + 1);
        for (line_no, line) in text.lines().enumerate() {
            let mut row = Vec::with_capacity(2 * width + 1);
            for c in line.chars() {
                match c {
                    '0' => row.push(true),
                    '1' => row.push(false),
                    ' ' | '\t' | ',' | '[' | ']' | '\r' => {}
                    other => {
                        return Err(GenerationError::MalformedInput(format!(
                            "unexpected character `{}` in maze line {}",
                            other,
                            line_no + 1
                        )))
                    }
                }
            }
            if row.is_empty() {
                continue;
            }
            if row.len() != 2 * width + 1 {
                return Err(GenerationError::MalformedInput(format!(
                    "maze row {} has {} entries, expected {}",
                    rows.len(),
                    row.len(),
                    2 * width + 1
                )));
            }
            rows.push(row);
        }

        if rows.len() != 2 * height + 1 {
            return Err(GenerationError::MalformedInput(format!(
                "maze has {} rows, expected {}",
                rows.len(),
                2 * height + 1
            )));
        }

        Ok(MazeMatrix {
            width,
            height,
            rows,
        })
    }

    pub fn from_file(path: &Path, width: usize, height: usize) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenerationError::io(path, e))?;
        MazeMatrix::parse(&text, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of regular cells.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Whether the wall of cell `(row, col)` in direction `dir` is open.
    pub fn is_open(&self, row: usize, col: usize, dir: Direction) -> bool {
        let (i, j) = (2 * row + 1, 2 * col + 1);
        match dir {
            Direction::Up => self.rows[i - 1][j],
            Direction::Left => self.rows[i][j - 1],
            Direction::Down => self.rows[i + 1][j],
            Direction::Right => self.rows[i][j + 1],
        }
    }

    /// The cell behind the wall of `(row, col)` in direction `dir`, if it lies inside the grid.
    pub fn neighbour(&self, row: usize, col: usize, dir: Direction) -> Option<usize> {
        let (r, c) = match dir {
            Direction::Up if row > 0 => (row - 1, col),
            Direction::Left if col > 0 => (row, col - 1),
            Direction::Down if row + 1 < self.height => (row + 1, col),
            Direction::Right if col + 1 < self.width => (row, col + 1),
            _ => return None,
        };
        Some(r * self.width + c)
    }
}

/// The cell sequence from the maze entry to its exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionPath {
    cells: Vec<usize>,
}

impl SolutionPath {
    pub fn new(cells: Vec<usize>, size: usize) -> Result<Self> {
        if cells.is_empty() {
            return Err(GenerationError::MalformedInput(
                "solution path is empty".to_string(),
            ));
        }
        if let Some(bad) = cells.iter().find(|&&c| c >= size) {
            return Err(GenerationError::MalformedInput(format!(
                "solution cell {} is outside of the maze (size {})",
                bad, size
            )));
        }
        Ok(SolutionPath { cells })
    }

    /// Parses a solution file with one cell id per line.
    pub fn parse(text: &str, size: usize) -> Result<Self> {
        let mut cells = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let cell = line.parse::<usize>().map_err(|_| {
                GenerationError::MalformedInput(format!(
                    "solution line {} is not a cell id: `{}`",
                    line_no + 1,
                    line
                ))
            })?;
            cells.push(cell);
        }
        SolutionPath::new(cells, size)
    }

    pub fn from_file(path: &Path, size: usize) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenerationError::io(path, e))?;
        SolutionPath::parse(&text, size)
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn entry(&self) -> usize {
        self.cells[0]
    }

    pub fn exit(&self) -> usize {
        self.cells[self.cells.len() - 1]
    }

    /// Successor of `cell` along the path; the exit leads to the bug.
    pub fn next_of(&self, cell: usize) -> Option<Cell> {
        let pos = self.cells.iter().position(|&c| c == cell)?;
        Some(match self.cells.get(pos + 1) {
            Some(&next) => Cell::Regular(next),
            None => Cell::Bug,
        })
    }

    /// Every step of the path, ending with the step from the exit into the bug.
    pub fn transitions(&self) -> Vec<(Cell, Cell)> {
        let mut steps: Vec<(Cell, Cell)> = self
            .cells
            .windows(2)
            .map(|w| (Cell::Regular(w[0]), Cell::Regular(w[1])))
            .collect();
        steps.push((Cell::Regular(self.exit()), Cell::Bug));
        steps
    }
}
