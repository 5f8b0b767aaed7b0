pub mod graph;
pub mod matrix;

pub use graph::{Cell, DiscoveryLabels, MazeGraph, TrimReport};
pub use matrix::{Direction, MazeMatrix, SolutionPath};
