mod utils;

use num_bigint_dig::BigInt;

use mazegen::config::{GenerationConfig, GeneratorKind};
use mazegen::formula::solver::SatStatus;
use mazegen::formula::term::build::{apply, bv, select};
use mazegen::formula::{ArrayDecl, ArrayModel, BvOp, CompiledFormula, SolverArtifact};
use mazegen::generator::{GuardStrategy, Witness};
use mazegen::maze::{Cell, MazeGraph, SolutionPath};
use mazegen::pipeline::build_program;
use mazegen::render::{render, replay, solution_transactions};

use crate::utils::{load_sample_formula, load_sample_maze};

fn default_config(keep: u32, seed: u64) -> GenerationConfig {
    GenerationConfig {
        cycle_keep_percent: keep,
        seed,
        ..GenerationConfig::default()
    }
}

#[test]
fn test_default_end_to_end() {
    let (matrix, solution) = load_sample_maze();
    let (program, trim) = build_program(&matrix, &solution, &default_config(0, 42), None).unwrap();

    assert_eq!(trim.removed, 24);
    for contract in [
        &program.contract,
        &program.property_contract,
        &program.foundry_contract,
    ]
    .iter()
    {
        assert_eq!(contract.matches("stop = true;").count(), 25);
        assert!(contract.starts_with("pragma solidity 0.8.26;\ncontract Maze {\n"));
        assert!(contract.contains("\tint64 next_cell = 0;\n"));
        assert!(contract.contains("\t\trequire(!stop && !bug, \"unable to take any further steps\");"));
    }

    let text = program.transactions_text();
    assert_eq!(text.lines().last(), Some("[ ]"));
    assert_eq!(text.lines().count(), 10);
    assert_eq!(program.transactions.len(), 10);
}

#[test]
fn test_generation_is_deterministic() {
    let (matrix, solution) = load_sample_maze();
    let config = GenerationConfig {
        generator: GeneratorKind::Equality,
        equality_percent: 40,
        ..default_config(20, 7)
    };
    let (first, _) = build_program(&matrix, &solution, &config, None).unwrap();
    let (second, _) = build_program(&matrix, &solution, &config, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cell_function_layout() {
    let (matrix, solution) = load_sample_maze();
    let graph = MazeGraph::build(&matrix, &solution).unwrap();
    let plan = GuardStrategy::Default.derive(&graph, &solution).unwrap();
    let program = render(&graph, &solution, &plan).unwrap();

    let func_0 = "\tfunction func_0(int8[] memory inp) internal {\n\
\tunchecked{\n\
\t\trequire(inp.length >= 1);\n\
\t\tif (inp[0] < -43) {\n\
\t\t\tnext_cell = -2;\n\
\t\t}\n\
\t\telse if (inp[0] < 42) {\n\
\t\t\tnext_cell = 5;\n\
\t\t}\n\
\t\telse if (inp[0] >= 42) {\n\
\t\t\tnext_cell = 1;\n\
\t\t}\n\
\t\telse {\n\
\t\t\tstop = true;\n\
\t\t}\n\
\t}\n\
\t}\n";
    assert!(program.contract.contains(func_0));
    assert!(program
        .contract
        .contains("\t\tif (next_cell == -1) {\n\t\t\tfunc_bug(inp);\n\t\t\treturn;\n\t\t}\n"));
    assert!(program
        .contract
        .contains("\t\tif (next_cell == 24) {\n\t\t\tfunc_24(inp);\n\t\t\treturn;\n\t\t}\n"));
    assert!(program.contract.ends_with("\t}\n}\n"));
    assert!(program
        .property_contract
        .ends_with("\tfunction echidna_noBug() external returns (bool) {\n\t\treturn !bug;\n\t}\n}\n"));
    assert!(program.foundry_contract.contains("contract TestMaze is Test {"));
    assert!(program.foundry_contract.contains("if (m.bug()) { fail(); }"));
}

#[test]
fn test_cell_without_edges_halts() {
    let (matrix, solution) = load_sample_maze();
    let mut graph = MazeGraph::build(&matrix, &solution).unwrap();
    graph.trim_cycles(0, 42, &solution).unwrap();
    // 18 and 22 were discovered before 23
    assert!(graph.successors(23).is_empty());

    let plan = GuardStrategy::Default.derive(&graph, &solution).unwrap();
    let program = render(&graph, &solution, &plan).unwrap();
    assert!(program.contract.contains(
        "\tfunction func_23(int8[] memory inp) internal {\n\tunchecked{\n\t\trequire(inp.length >= 1);\n\t\tif (false) {\n\t\t}\n\t\telse {\n\t\t\tstop = true;\n\t\t}\n\t}\n\t}\n"
    ));
}

#[test]
fn test_constraint_block_rendering() {
    let (matrix, solution) = load_sample_maze();
    let formula = load_sample_formula(100);
    let config = GenerationConfig {
        generator: GeneratorKind::Constraint,
        ..default_config(100, 0)
    };
    let (program, _) = build_program(&matrix, &solution, &config, Some(&formula)).unwrap();

    let block = "\t\trequire(inp.length >= 13);\n\
\t\tint32 flag = 0;\n\
\t\tif ((!(inp[12] == int8(uint8(0))))) {\n\
\t\t\tif ((uint8((uint16(int16(inp[12])) << 0) >> 8) == uint8(255))) {\n\
\t\t\t\tflag = 1;\n\
\t\t\t}\n\
\t\t}\n";
    assert!(program.contract.contains(block));
    assert!(program.contract.contains("\t\telse if (flag == 1) {\n\t\t\tnext_cell = 7;\n\t\t}\n"));

    assert_eq!(program.transactions[0], formula.witness);
    assert_eq!(program.transactions[2], formula.witness);
    assert_eq!(program.transactions[9], Witness::empty());
}

#[test]
fn test_replay_reaches_the_bug() {
    let (matrix, solution) = load_sample_maze();
    let formula = load_sample_formula(100);
    let mut graph = MazeGraph::build(&matrix, &solution).unwrap();
    graph.trim_cycles(0, 5, &solution).unwrap();

    for strategy in [
        GuardStrategy::Default,
        GuardStrategy::Equality {
            percent: 60,
            seed: 5,
        },
        GuardStrategy::Constraint(&formula),
    ]
    .iter()
    {
        let plan = strategy.derive(&graph, &solution).unwrap();
        let transactions = solution_transactions(&plan, &solution).unwrap();
        let outcome = replay(&graph, &solution, &plan, &transactions).unwrap();
        assert!(outcome.reached_bug(transactions.len()), "{}", strategy);
        assert_eq!(outcome.position, Cell::Bug);
    }
}

#[test]
fn test_replay_rejects_short_and_wrong_inputs() {
    let (matrix, solution) = load_sample_maze();
    let formula = load_sample_formula(100);
    let graph = MazeGraph::build(&matrix, &solution).unwrap();
    let plan = GuardStrategy::Constraint(&formula)
        .derive(&graph, &solution)
        .unwrap();

    // cell 0 needs eight inputs
    let outcome = replay(&graph, &solution, &plan, &[Witness::single(0)]).unwrap();
    assert_eq!(outcome.rejected, Some(0));
    assert_eq!(outcome.position, Cell::Regular(0));

    // all zeros leave the flag unset and walk 0 -> 5 -> 10
    let zeros = Witness(vec![0; 100]);
    let outcome = replay(&graph, &solution, &plan, &[zeros.clone(), zeros]).unwrap();
    assert_eq!(outcome.accepted, 2);
    assert_eq!(outcome.position, Cell::Regular(10));
    assert!(!outcome.reached_bug(2));

    // from cell 24 a non-negative input enters the bug, later steps revert
    let short = SolutionPath::new(vec![24], 25).unwrap();
    let outcome = replay(
        &graph,
        &short,
        &plan,
        &[Witness::single(0), Witness::empty(), Witness::empty()],
    )
    .unwrap();
    assert!(outcome.bug);
    assert_eq!(outcome.rejected, Some(2));
}

#[test]
fn test_replay_rejects_division_by_zero() {
    let (matrix, solution) = load_sample_maze();
    let graph = MazeGraph::build(&matrix, &solution).unwrap();
    let solved = SolverArtifact {
        status: SatStatus::Sat,
        arrays: vec![ArrayDecl {
            name: "a".to_string(),
            index_width: 32,
            element_width: 8,
        }],
        ignored_symbols: vec![],
        clauses: vec![apply(
            BvOp::Eq,
            apply(BvOp::Urem, select("a", 0), select("a", 1)),
            bv(1, 8),
        )],
        model: Some(ArrayModel {
            default: BigInt::from(0),
            overrides: vec![(0, BigInt::from(7)), (1, BigInt::from(3))]
                .into_iter()
                .collect(),
        }),
    }
    .into_solved()
    .unwrap();
    let formula = CompiledFormula::from_solved(&solved, 100).unwrap();
    let plan = GuardStrategy::Constraint(&formula)
        .derive(&graph, &solution)
        .unwrap();
    assert_eq!(plan.required_length(0), 2);

    let transactions = solution_transactions(&plan, &solution).unwrap();
    let outcome = replay(&graph, &solution, &plan, &transactions).unwrap();
    assert!(outcome.reached_bug(transactions.len()));

    // 7 % 0 reverts the whole step
    let outcome = replay(&graph, &solution, &plan, &[Witness(vec![7, 0])]).unwrap();
    assert_eq!(outcome.rejected, Some(0));
    assert_eq!(outcome.accepted, 0);
    assert_eq!(outcome.position, Cell::Regular(0));
}
