//! Document errors.

use crate::path::PathError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// DocumentError represents a failed document operation.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("{path}: type mismatch: cannot merge {actual} into {expected}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("{path}: index {index} out of range for list of length {len}")]
    IndexOutOfRange { path: String, index: i64, len: usize },

    #[error("document has no filename to write to")]
    MissingFilename,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("problem with YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("problem with JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        DocumentError::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DocumentError::Io {
            path: path.into(),
            source,
        }
    }
}
