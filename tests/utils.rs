#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mazegen::formula::{ArtifactSolver, CompiledFormula, ConstraintSolver};
use mazegen::maze::{MazeMatrix, SolutionPath};

pub const SAMPLE_WIDTH: usize = 5;
pub const SAMPLE_HEIGHT: usize = 5;
pub const SAMPLE_PATH: [usize; 9] = [0, 1, 2, 7, 12, 13, 14, 19, 24];

pub fn sample_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("sample")
        .join(name)
}

/// The 5x5 sample maze: a spanning tree plus the passages 6-7, 8-13 and 17-22,
/// entered above cell 0 and left below cell 24.
pub fn load_sample_maze() -> (MazeMatrix, SolutionPath) {
    let matrix =
        MazeMatrix::from_file(&sample_file("maze.txt"), SAMPLE_WIDTH, SAMPLE_HEIGHT).unwrap();
    let solution = SolutionPath::from_file(&sample_file("maze_solution.txt"), matrix.size()).unwrap();
    (matrix, solution)
}

pub fn load_sample_formula(domain_size: usize) -> CompiledFormula {
    let solved = ArtifactSolver
        .solve(&sample_file("cve_sample.json"))
        .unwrap();
    CompiledFormula::from_solved(&solved, domain_size).unwrap()
}

/// Renders a maze matrix with the given passages between neighbouring cells.
///
/// `entry` opens the wall above cell 0, `exit` the wall below the last cell.
pub fn maze_text(
    width: usize,
    height: usize,
    passages: &[(usize, usize)],
    entry: bool,
    exit: bool,
) -> String {
    let mut rows = vec![vec!['1'; 2 * width + 1]; 2 * height + 1];
    for r in 0..height {
        for c in 0..width {
            rows[2 * r + 1][2 * c + 1] = '0';
        }
    }
    for &(a, b) in passages {
        let (ra, ca) = (a / width, a % width);
        let (rb, cb) = (b / width, b % width);
        rows[ra + rb + 1][ca + cb + 1] = '0';
    }
    if entry {
        rows[0][1] = '0';
    }
    if exit {
        rows[2 * height][2 * width - 1] = '0';
    }
    rows.iter()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
