use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{load_config_from_json, GenerationConfig, GeneratorKind};
use crate::error::{GenerationError, Result};
use crate::pipeline::GenerationRequest;

pub struct Input {
    pub maze: PathBuf,
    pub solution: PathBuf,
    pub formula: Option<PathBuf>,
    pub output: PathBuf,
    pub config_path: Option<String>,
    pub config: GenerationConfig,
}

impl Input {
    pub fn new() -> std::result::Result<Input, ()> {
        let matches = input_processing::view();
        Input::from_matches(&matches).map_err(|e| {
            eprintln!("{}", e);
        })
    }

    /// Parses an explicit argument list; the first item is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Input>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = input_processing::app()
            .get_matches_from_safe(args)
            .map_err(|e| GenerationError::Configuration(e.message))?;
        Input::from_matches(&matches)
    }

    fn from_matches(matches: &clap::ArgMatches) -> Result<Input> {
        use input_processing::*;

        let maze = PathBuf::from(matches.value_of("maze").unwrap_or_default());
        let solution = match matches.value_of("solution") {
            Some(path) => PathBuf::from(path),
            None => default_solution_path(&maze),
        };
        let config_path = matches.value_of("config").map(str::to_string);
        let mut config = match &config_path {
            Some(path) if !Path::new(path).is_file() => {
                return Err(GenerationError::Configuration(format!(
                    "settings file `{}` does not exist",
                    path
                )))
            }
            Some(path) => load_config_from_json(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(width) = parse_number(matches, "width")? {
            config.width = width;
        }
        if let Some(height) = parse_number(matches, "height")? {
            config.height = height;
        }
        if let Some(cycle) = parse_number(matches, "cycle")? {
            config.cycle_keep_percent = cycle;
        }
        if let Some(seed) = parse_number(matches, "seed")? {
            config.seed = seed;
        }
        if let Some(generator) = matches.value_of("generator") {
            config.generator = generator.parse::<GeneratorKind>()?;
        }
        if let Some(equality) = parse_number(matches, "equality")? {
            config.equality_percent = equality;
        }
        if let Some(domain) = parse_number(matches, "domain")? {
            config.domain_size = domain;
        }
        if matches.is_present("skip_replay") {
            config.skip_replay = true;
        }

        Ok(Input {
            maze,
            solution,
            formula: matches.value_of("formula").map(PathBuf::from),
            output: PathBuf::from(matches.value_of("output").unwrap_or(".")),
            config_path,
            config,
        })
    }

    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest {
            maze: self.maze,
            solution: self.solution,
            formula: self.formula,
            output: self.output,
            config: self.config,
        }
    }
}

/// `dir/maze.txt` is solved by `dir/maze_solution.txt`.
pub fn default_solution_path(maze: &Path) -> PathBuf {
    let stem = maze
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    maze.with_file_name(format!("{}_solution.txt", stem))
}

mod input_processing {
    use std::str::FromStr;

    use clap::{App, Arg, ArgMatches};

    use crate::error::{GenerationError, Result};
    use crate::VERSION;

    pub fn parse_number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>> {
        match matches.value_of(name) {
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
                GenerationError::Configuration(format!(
                    "`--{}` expects a non-negative integer (got `{}`)",
                    name, raw
                ))
            }),
            None => Ok(None),
        }
    }

    pub fn view() -> ArgMatches<'static> {
        app().get_matches()
    }

    pub fn app() -> App<'static, 'static> {
        App::new("mazegen")
            .version(VERSION)
            .about("Maze-shaped Solidity benchmark generator")
            .arg(
                Arg::with_name("maze")
                    .long("maze")
                    .takes_value(true)
                    .required(true)
                    .display_order(1)
                    .help("Maze matrix of 0 (passage) and 1 (wall)"),
            )
            .arg(
                Arg::with_name("solution")
                    .long("solution")
                    .takes_value(true)
                    .display_order(2)
                    .help("Cells from the entry to the exit, one per line [default: <maze>_solution.txt]"),
            )
            .arg(
                Arg::with_name("width")
                    .short("w")
                    .long("width")
                    .takes_value(true)
                    .display_order(3)
                    .help("Number of cells per row"),
            )
            .arg(
                Arg::with_name("height")
                    .long("height")
                    .takes_value(true)
                    .display_order(4)
                    .help("Number of rows"),
            )
            .arg(
                Arg::with_name("cycle")
                    .short("c")
                    .long("cycle")
                    .takes_value(true)
                    .display_order(5)
                    .help("Percentage of cycles kept in the maze"),
            )
            .arg(
                Arg::with_name("seed")
                    .short("s")
                    .long("seed")
                    .takes_value(true)
                    .display_order(6)
                    .help("Seed of cycle trimming and equality selection"),
            )
            .arg(
                Arg::with_name("generator")
                    .short("g")
                    .long("generator")
                    .takes_value(true)
                    .possible_values(&["default", "equality", "constraint"])
                    .display_order(7)
                    .help("Guard generator"),
            )
            .arg(
                Arg::with_name("equality")
                    .short("e")
                    .long("equality")
                    .takes_value(true)
                    .display_order(8)
                    .help("Percentage of edges guarded by equality checks"),
            )
            .arg(
                Arg::with_name("formula")
                    .long("formula")
                    .takes_value(true)
                    .display_order(9)
                    .help("Solved bug-triggering formula (JSON) for the constraint generator"),
            )
            .arg(
                Arg::with_name("output")
                    .short("o")
                    .long("output")
                    .takes_value(true)
                    .display_order(10)
                    .help("Output directory [default: .]"),
            )
            .arg(
                Arg::with_name("domain")
                    .long("domain")
                    .takes_value(true)
                    .display_order(11)
                    .help("Number of array elements carried by constraint witnesses"),
            )
            .arg(
                Arg::with_name("config")
                    .long("config")
                    .takes_value(true)
                    .display_order(12)
                    .help("JSON file with generation settings"),
            )
            .arg(
                Arg::with_name("skip_replay")
                    .long("skip-replay")
                    .takes_value(false)
                    .display_order(13)
                    .help("Do not replay the transactions against the guard model"),
            )
    }
}
