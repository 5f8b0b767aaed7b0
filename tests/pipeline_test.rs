mod utils;

use std::fs;
use std::path::Path;

use num_bigint_dig::BigInt;

use mazegen::config::{load_config_from_json, GenerationConfig, GeneratorKind};
use mazegen::error::GenerationError;
use mazegen::formula::solver::SatStatus;
use mazegen::formula::term::build::{apply, bv, select};
use mazegen::formula::{ArrayDecl, ArrayModel, BvOp, SolverArtifact};
use mazegen::input_user::{default_solution_path, Input};
use mazegen::pipeline::{base_name, generate, strategy_name, GenerationRequest};

use crate::utils::sample_file;

fn request(output: &Path, config: GenerationConfig, formula: bool) -> GenerationRequest {
    GenerationRequest {
        maze: sample_file("maze.txt"),
        solution: sample_file("maze_solution.txt"),
        formula: if formula {
            Some(sample_file("cve_sample.json"))
        } else {
            None
        },
        output: output.to_path_buf(),
        config,
    }
}

#[test]
fn test_output_names() {
    assert_eq!(
        strategy_name(GeneratorKind::Equality, 30, None).unwrap(),
        "equality30_gen"
    );
    assert_eq!(
        strategy_name(
            GeneratorKind::Constraint,
            0,
            Some(Path::new("formulas/CVE-2018-13836.json"))
        )
        .unwrap(),
        "CVE-2018-13836_gen"
    );
    assert!(strategy_name(GeneratorKind::Constraint, 0, None).is_err());
    assert_eq!(
        base_name(Path::new("mazes/maze.txt"), 25, "default_gen").unwrap(),
        "maze_25percent_default_gen"
    );
}

#[test]
fn test_generate_writes_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        cycle_keep_percent: 0,
        seed: 42,
        ..GenerationConfig::default()
    };
    let summary = generate(&request(dir.path(), config, false)).unwrap();

    assert_eq!(summary.base_name, "maze_0percent_default_gen");
    assert_eq!(summary.steps, 10);
    assert_eq!(
        summary.files.property,
        dir.path().join("maze_0percent_default_gen.sol")
    );

    let property = fs::read_to_string(&summary.files.property).unwrap();
    assert!(property.contains("function echidna_noBug()"));
    let foundry = fs::read_to_string(&summary.files.foundry).unwrap();
    assert!(foundry.contains("import \"forge-std/Test.sol\";"));
    let transactions = fs::read_to_string(&summary.files.transactions).unwrap();
    assert_eq!(transactions.lines().last(), Some("[ ]"));
}

#[test]
fn test_generate_with_formula() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        generator: GeneratorKind::Constraint,
        ..GenerationConfig::default()
    };
    let summary = generate(&request(dir.path(), config, true)).unwrap();
    assert_eq!(summary.base_name, "maze_100percent_cve_sample_gen");

    let transactions = fs::read_to_string(&summary.files.transactions).unwrap();
    let first = transactions.lines().next().unwrap();
    assert!(first.starts_with("[ 0, 0, 0, 5, 0, 0, 0, 2, 0, 0, 10, 0, -2, 0"));
}

#[test]
fn test_zero_divisor_model_fails_generation() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = SolverArtifact {
        status: SatStatus::Sat,
        arrays: vec![ArrayDecl {
            name: "a".to_string(),
            index_width: 32,
            element_width: 8,
        }],
        ignored_symbols: vec![],
        clauses: vec![apply(
            BvOp::Eq,
            apply(BvOp::Udiv, select("a", 0), select("a", 1)),
            bv(255, 8),
        )],
        model: Some(ArrayModel {
            default: BigInt::from(0),
            overrides: vec![(0, BigInt::from(5))].into_iter().collect(),
        }),
    };
    let formula = dir.path().join("divide.json");
    fs::write(&formula, serde_json::to_string(&artifact).unwrap()).unwrap();

    let output = dir.path().join("out");
    let mut divide = request(&output, GenerationConfig::default(), false);
    divide.config.generator = GeneratorKind::Constraint;
    divide.formula = Some(formula);
    assert!(matches!(
        generate(&divide),
        Err(GenerationError::InvariantViolation(_))
    ));
    assert!(!output.join("maze_100percent_divide_gen.sol").exists());
}

#[test]
fn test_invalid_settings_are_rejected_early() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        cycle_keep_percent: 120,
        ..GenerationConfig::default()
    };
    assert!(matches!(
        generate(&request(dir.path(), config, false)),
        Err(GenerationError::Configuration(_))
    ));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());

    let config = GenerationConfig {
        width: 4,
        ..GenerationConfig::default()
    };
    assert!(matches!(
        generate(&request(dir.path(), config, false)),
        Err(GenerationError::MalformedInput(_))
    ));
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"seed": 11, "generator": "equality", "equality_percent": 30}"#).unwrap();

    let config = load_config_from_json(path.to_str().unwrap()).unwrap();
    assert_eq!(config.seed, 11);
    assert_eq!(config.generator, GeneratorKind::Equality);
    assert_eq!(config.equality_percent, 30);
    assert_eq!(config.domain_size, 100);

    let missing = dir.path().join("missing.json");
    assert_eq!(
        load_config_from_json(missing.to_str().unwrap()).unwrap(),
        GenerationConfig::default()
    );
}

#[test]
fn test_command_line() {
    let input = Input::from_args(vec![
        "mazegen",
        "--maze",
        "mazes/maze.txt",
        "-w",
        "10",
        "--height",
        "8",
        "-c",
        "40",
        "-s",
        "3",
        "-g",
        "equality",
        "-e",
        "25",
        "-o",
        "out",
        "--skip-replay",
    ])
    .unwrap();

    assert_eq!(input.solution, Path::new("mazes/maze_solution.txt"));
    assert_eq!(input.output, Path::new("out"));
    assert_eq!(input.formula, None);
    assert_eq!(input.config.width, 10);
    assert_eq!(input.config.height, 8);
    assert_eq!(input.config.cycle_keep_percent, 40);
    assert_eq!(input.config.seed, 3);
    assert_eq!(input.config.generator, GeneratorKind::Equality);
    assert_eq!(input.config.equality_percent, 25);
    assert!(input.config.skip_replay);

    assert!(Input::from_args(vec!["mazegen", "--maze", "m.txt", "-c", "lots"]).is_err());
    assert!(Input::from_args(vec!["mazegen", "-w", "3"]).is_err());
    assert!(matches!(
        Input::from_args(vec!["mazegen", "--maze", "m.txt", "--config", "no/such/settings.json"]),
        Err(GenerationError::Configuration(_))
    ));
    assert_eq!(
        default_solution_path(Path::new("maze.txt")),
        Path::new("maze_solution.txt")
    );
}
