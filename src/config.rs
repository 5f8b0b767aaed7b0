use std::fmt;
use std::fs::File;
use std::str::FromStr;

use colored::Colorize;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Witness domain: number of array elements a constraint-guarded step carries.
pub const DEFAULT_DOMAIN_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Default,
    Equality,
    Constraint,
}

impl FromStr for GeneratorKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(GeneratorKind::Default),
            "equality" => Ok(GeneratorKind::Equality),
            "constraint" => Ok(GeneratorKind::Constraint),
            _ => Err(GenerationError::Configuration(format!(
                "`generator` should be one of [`default`, `equality`, `constraint`] (got `{}`)",
                s
            ))),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorKind::Default => "default",
            GeneratorKind::Equality => "equality",
            GeneratorKind::Constraint => "constraint",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: usize,
    pub height: usize,
    /// Share of the maze's cycles that survive trimming.
    pub cycle_keep_percent: u32,
    pub seed: u64,
    pub generator: GeneratorKind,
    /// Share of edges guarded by equality matches.
    pub equality_percent: u32,
    pub domain_size: usize,
    pub skip_replay: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            width: 5,
            height: 5,
            cycle_keep_percent: 100,
            seed: 0,
            generator: GeneratorKind::Default,
            equality_percent: 0,
            domain_size: DEFAULT_DOMAIN_SIZE,
            skip_replay: false,
        }
    }
}

impl GenerationConfig {
    /// Rejects settings that cannot describe a maze benchmark.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationError::Configuration(format!(
                "maze dimensions must be at least 1x1 (got {}x{})",
                self.width, self.height
            )));
        }
        if self.cycle_keep_percent > 100 {
            return Err(GenerationError::Configuration(format!(
                "cycle percentage must be within [0, 100] (got {})",
                self.cycle_keep_percent
            )));
        }
        if self.equality_percent > 100 {
            return Err(GenerationError::Configuration(format!(
                "equality percentage must be within [0, 100] (got {})",
                self.equality_percent
            )));
        }
        if self.domain_size == 0 {
            return Err(GenerationError::Configuration(
                "witness domain must hold at least one element".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🧱 Generation Settings:
    ├─ Maze Dimensions      : {}
    ├─ Kept Cycles          : {}
    ├─ Seed                 : {}
    ├─ Guard Generator      : {}
    ├─ Equality Edges       : {}
    ├─ Witness Domain       : {}
    └─ Replay Check         : {}",
            format!("{}x{}", self.width, self.height).bright_yellow(),
            format!("{}%", self.cycle_keep_percent).bright_yellow(),
            self.seed.to_string().bright_yellow(),
            self.generator.to_string().bright_yellow(),
            format!("{}%", self.equality_percent).bright_yellow(),
            self.domain_size.to_string().bright_yellow(),
            (if self.skip_replay { "off" } else { "on" }).bright_yellow()
        )
    }
}

/// Reads settings from `file_path`, falling back to the defaults when the file is absent.
pub fn load_config_from_json(file_path: &str) -> Result<GenerationConfig> {
    match File::open(file_path) {
        Ok(file) => {
            let settings: GenerationConfig = serde_json::from_reader(file)?;
            Ok(settings)
        }
        Err(_) => {
            info!("Use the default setting for maze generation");
            Ok(GenerationConfig::default())
        }
    }
}
