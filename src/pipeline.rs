use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{GenerationConfig, GeneratorKind};
use crate::error::{GenerationError, Result};
use crate::formula::{ArtifactSolver, CompiledFormula, ConstraintSolver};
use crate::generator::GuardStrategy;
use crate::maze::{MazeGraph, MazeMatrix, SolutionPath, TrimReport};
use crate::render::{self, GeneratedProgram, OutputFiles};

/// Input artifacts and settings of one generation run.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub maze: PathBuf,
    pub solution: PathBuf,
    pub formula: Option<PathBuf>,
    pub output: PathBuf,
    pub config: GenerationConfig,
}

#[derive(Clone, Debug)]
pub struct GenerationSummary {
    pub base_name: String,
    pub files: OutputFiles,
    pub trim: TrimReport,
    pub steps: usize,
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            GenerationError::Configuration(format!("`{}` has no file name", path.display()))
        })
}

/// Name of the guard strategy as it appears in output file names.
pub fn strategy_name(
    kind: GeneratorKind,
    equality_percent: u32,
    formula: Option<&Path>,
) -> Result<String> {
    match kind {
        GeneratorKind::Default => Ok("default_gen".to_string()),
        GeneratorKind::Equality => Ok(format!("equality{}_gen", equality_percent)),
        GeneratorKind::Constraint => {
            let formula = formula.ok_or_else(|| {
                GenerationError::Configuration(
                    "the constraint generator needs a formula".to_string(),
                )
            })?;
            Ok(format!("{}_gen", file_stem(formula)?))
        }
    }
}

/// `<maze-stem>_<keep>percent_<strategy>`
pub fn base_name(maze: &Path, keep_percent: u32, strategy: &str) -> Result<String> {
    Ok(format!(
        "{}_{}percent_{}",
        file_stem(maze)?,
        keep_percent,
        strategy
    ))
}

/// Builds, trims, guards and renders one maze. Nothing is written to disk.
///
/// # Arguments
///
/// * `matrix` - The parsed maze.
/// * `solution` - The cells leading from the entry to the exit.
/// * `config` - Validated generation settings.
/// * `formula` - Clauses for the constraint generator, ignored by the others.
///
/// # Returns
///
/// The rendered program together with the outcome of cycle trimming.
pub fn build_program(
    matrix: &MazeMatrix,
    solution: &SolutionPath,
    config: &GenerationConfig,
    formula: Option<&CompiledFormula>,
) -> Result<(GeneratedProgram, TrimReport)> {
    config.validate()?;

    let mut graph = MazeGraph::build(matrix, solution)?;
    let trim = graph.trim_cycles(config.cycle_keep_percent, config.seed, solution)?;
    info!(
        "removed {} of {} back-edges ({}% kept)",
        trim.removed, trim.backedges, config.cycle_keep_percent
    );

    let strategy = match config.generator {
        GeneratorKind::Default => GuardStrategy::Default,
        GeneratorKind::Equality => GuardStrategy::Equality {
            percent: config.equality_percent,
            seed: config.seed,
        },
        GeneratorKind::Constraint => GuardStrategy::Constraint(formula.ok_or_else(|| {
            GenerationError::Configuration(
                "the constraint generator needs a formula".to_string(),
            )
        })?),
    };
    let plan = strategy.derive(&graph, solution)?;
    let program = render::render(&graph, solution, &plan)?;

    if !config.skip_replay {
        let outcome = render::replay(&graph, solution, &plan, &program.transactions)?;
        if !outcome.reached_bug(program.transactions.len()) {
            return Err(GenerationError::InvariantViolation(format!(
                "transactions end at {} without reaching the bug ({} of {} steps accepted)",
                outcome.position,
                outcome.accepted,
                program.transactions.len()
            )));
        }
        debug!("replay reached the bug in {} steps", outcome.accepted);
    }

    Ok((program, trim))
}

/// Runs a whole generation with an explicit constraint solver.
pub fn generate_with<S: ConstraintSolver>(
    request: &GenerationRequest,
    solver: &S,
) -> Result<GenerationSummary> {
    let config = &request.config;
    config.validate()?;

    let strategy = strategy_name(
        config.generator,
        config.equality_percent,
        request.formula.as_deref(),
    )?;
    let base = base_name(&request.maze, config.cycle_keep_percent, &strategy)?;

    let matrix = MazeMatrix::from_file(&request.maze, config.width, config.height)?;
    let solution = SolutionPath::from_file(&request.solution, matrix.size())?;

    let formula = match (config.generator, &request.formula) {
        (GeneratorKind::Constraint, Some(path)) => {
            let solved = solver.solve(path)?;
            Some(CompiledFormula::from_solved(&solved, config.domain_size)?)
        }
        _ => None,
    };

    let (program, trim) = build_program(&matrix, &solution, config, formula.as_ref())?;
    let files = program.write(&request.output, &base)?;

    Ok(GenerationSummary {
        base_name: base,
        files,
        trim,
        steps: program.transactions.len(),
    })
}

/// Runs a whole generation, reading formulas from solver artifacts.
pub fn generate(request: &GenerationRequest) -> Result<GenerationSummary> {
    generate_with(request, &ArtifactSolver)
}
