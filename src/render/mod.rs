pub mod replay;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{GenerationError, Result};
use crate::formula::Clause;
use crate::generator::{GuardPlan, Witness};
use crate::maze::{Cell, MazeGraph, SolutionPath};

pub use replay::{replay, ReplayOutcome};

const HEADER: &str = "pragma solidity 0.8.26;\ncontract Maze {\n";

const TERMINALS: &str = "\tfunction func_start(int8[] memory inp) internal {}\n\
\tfunction func_bug(int8[] memory inp) internal {\n\t\tbug = true;\n\t\treturn;\n\t}\n";

const HALT: &str = "\t\telse {\n\t\t\tstop = true;\n\t\t}";

const PROPERTY_SUFFIX: &str =
    "\tfunction echidna_noBug() external returns (bool) {\n\t\treturn !bug;\n\t}\n}\n";

const FOUNDRY_SUFFIX: &str = r#"}
import "forge-std/Test.sol";
contract TestMaze is Test {
    Maze m;
    function setUp() external {
        m = new Maze();
    }
    function invariant_no_bug() external {
        if (m.bug()) { fail(); }
    }
}
"#;

/// The rendered benchmark: three contract variants and the inputs solving the maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedProgram {
    pub contract: String,
    /// Variant exposing `echidna_noBug()`.
    pub property_contract: String,
    /// Variant with a Foundry invariant test.
    pub foundry_contract: String,
    /// Inputs along the solution path, closed by one empty step.
    pub transactions: Vec<Witness>,
}

/// Files written for one benchmark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFiles {
    pub property: PathBuf,
    pub foundry: PathBuf,
    pub transactions: PathBuf,
}

impl GeneratedProgram {
    pub fn transactions_text(&self) -> String {
        self.transactions
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes `<base>.sol`, `<base>.foundry.sol` and `<base>_transactions.txt` into `dir`.
    pub fn write(&self, dir: &Path, base: &str) -> Result<OutputFiles> {
        fs::create_dir_all(dir).map_err(|e| GenerationError::io(dir, e))?;
        let files = OutputFiles {
            property: dir.join(format!("{}.sol", base)),
            foundry: dir.join(format!("{}.foundry.sol", base)),
            transactions: dir.join(format!("{}_transactions.txt", base)),
        };
        write_file(&files.property, &self.property_contract)?;
        write_file(&files.foundry, &self.foundry_contract)?;
        write_file(&files.transactions, &self.transactions_text())?;
        info!("wrote {}", files.property.display());
        Ok(files)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| GenerationError::io(path, e))
}

/// Walks the solution through the witness table and appends the empty step that enters
/// the bug function.
pub fn solution_transactions(plan: &GuardPlan, solution: &SolutionPath) -> Result<Vec<Witness>> {
    let mut transactions = Vec::with_capacity(solution.cells().len() + 1);
    for (from, to) in solution.transitions() {
        let witness = plan.witnesses.get(from, to).ok_or_else(|| {
            GenerationError::InvariantViolation(format!(
                "no input takes the solution step {} -> {}",
                from, to
            ))
        })?;
        transactions.push(witness.clone());
    }
    transactions.push(Witness::empty());
    Ok(transactions)
}

fn constraint_block(clauses: &[Clause]) -> String {
    if clauses.is_empty() {
        return String::new();
    }
    let mut block = String::from("\t\tint32 flag = 0;\n");
    for (depth, clause) in clauses.iter().enumerate() {
        block.push_str(&format!(
            "{}if ({}) {{\n",
            "\t".repeat(depth + 2),
            clause.expression
        ));
    }
    block.push_str(&format!("{}flag = 1;\n", "\t".repeat(clauses.len() + 2)));
    for depth in (0..clauses.len()).rev() {
        block.push_str(&format!("{}}}\n", "\t".repeat(depth + 2)));
    }
    block
}

fn render_cell(id: usize, successors: &[Cell], plan: &GuardPlan) -> String {
    let mut function = format!(
        "\tfunction func_{}(int8[] memory inp) internal {{\n\tunchecked{{\n\t\trequire(inp.length >= {});\n",
        id,
        plan.required_length(id)
    );
    function.push_str(&constraint_block(&plan.constraint_blocks[id]));

    if successors.is_empty() {
        function.push_str("\t\tif (false) {\n\t\t}\n");
    }
    for (n, (next, condition)) in successors.iter().zip(&plan.guards[id]).enumerate() {
        let keyword = if n == 0 { "if" } else { "else if" };
        function.push_str(&format!(
            "\t\t{} ({}) {{\n\t\t\tnext_cell = {};\n\t\t}}\n",
            keyword,
            condition,
            next.code()
        ));
    }
    function.push_str(HALT);
    function.push_str("\n\t}\n\t}\n");
    function
}

fn route(code: i64, function: &str) -> String {
    format!(
        "\t\tif (next_cell == {}) {{\n\t\t\tfunc_{}(inp);\n\t\t\treturn;\n\t\t}}\n",
        code, function
    )
}

fn render_dispatcher(size: usize) -> String {
    let mut step = String::from("\tfunction step(int8[] calldata inp) external {\n\n");
    step.push_str("\t\trequire(!stop && !bug, \"unable to take any further steps\");\n\n");
    step.push_str(&route(Cell::Start.code(), "start"));
    step.push_str(&route(Cell::Bug.code(), "bug"));
    for id in 0..size {
        step.push_str(&route(id as i64, &id.to_string()));
    }
    step.push_str("\t}\n");
    step
}

/// Renders the contract for `graph` guarded by `plan`, together with its solving inputs.
pub fn render(
    graph: &MazeGraph,
    solution: &SolutionPath,
    plan: &GuardPlan,
) -> Result<GeneratedProgram> {
    plan.check(graph, solution)?;

    let mut body = String::from(HEADER);
    body.push_str("\tbool public bug = false;\n");
    body.push_str("\tbool private stop = false;\n");
    body.push_str(&format!("\tint64 next_cell = {};\n", solution.entry()));
    body.push_str(TERMINALS);
    for (id, successors) in graph.edges().iter().enumerate() {
        body.push_str(&render_cell(id, successors, plan));
    }
    body.push_str(&render_dispatcher(graph.size()));

    Ok(GeneratedProgram {
        contract: format!("{}}}\n", body),
        property_contract: format!("{}{}", body, PROPERTY_SUFFIX),
        foundry_contract: format!("{}{}", body, FOUNDRY_SUFFIX),
        transactions: solution_transactions(plan, solution)?,
    })
}
