use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Reason a constraint formula could not be turned into guard code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintErrorKind {
    /// Node shape that never appears in a well-formed clause.
    Unrecognized,
    /// Known node shape without a Solidity translation.
    Unsupported,
    /// Clause reads an array other than the designated input array.
    MultipleArrays,
    /// The external solver reported the formula as unsatisfiable.
    Unsatisfiable,
    /// Clause reads an index outside the witness domain.
    OutOfDomain,
}

impl fmt::Display for ConstraintErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConstraintErrorKind::Unrecognized => "unrecognized type",
            ConstraintErrorKind::Unsupported => "unsupported type",
            ConstraintErrorKind::MultipleArrays => "multiple input arrays",
            ConstraintErrorKind::Unsatisfiable => "unsatisfiable formula",
            ConstraintErrorKind::OutOfDomain => "index outside of witness domain",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("{kind}: {construct}")]
    UnsupportedConstraint {
        kind: ConstraintErrorKind,
        construct: String,
    },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Evaluation hit an operation the generated contract reverts on.
    #[error("contract reverts: {0}")]
    Reverted(String),
    #[error("unable to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn unsupported(kind: ConstraintErrorKind, construct: impl Into<String>) -> Self {
        GenerationError::UnsupportedConstraint {
            kind,
            construct: construct.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        GenerationError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
