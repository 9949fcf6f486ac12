//! Temporary artifact implementation.

use crate::document::{Document, DocumentError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::debug;

/// ArtifactError is returned when a temporary artifact cannot be produced.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot create temporary file: {0}")]
    Create(#[source] io::Error),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] DocumentError),
}

/// TempArtifact is a file that lives as long as the value does.
#[derive(Debug)]
pub struct TempArtifact {
    file: NamedTempFile,
}

impl TempArtifact {
    /// Creates an artifact holding `contents`.
    pub fn with_contents(
        prefix: &str,
        suffix: &str,
        contents: &[u8],
    ) -> Result<Self, ArtifactError> {
        let mut file = Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile()
            .map_err(ArtifactError::Create)?;
        file.write_all(contents)
            .and_then(|_| file.flush())
            .map_err(|source| ArtifactError::Write {
                path: file.path().to_path_buf(),
                source,
            })?;
        debug!(path = %file.path().display(), "created artifact");
        Ok(TempArtifact { file })
    }

    /// Writes `doc` as YAML.
    pub fn from_document(prefix: &str, doc: &Document) -> Result<Self, ArtifactError> {
        let yaml = crate::value::to_yaml(doc.root()).map_err(DocumentError::from)?;
        Self::with_contents(prefix, ".yml", yaml.as_bytes())
    }

    /// Copies the file at `source`.
    pub fn copy_of(prefix: &str, source: &Path) -> Result<Self, ArtifactError> {
        let contents = fs::read(source).map_err(|e| ArtifactError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        Self::with_contents(prefix, "", &contents)
    }

    /// Concatenates the files in `sources`, in order.
    pub fn concat<P: AsRef<Path>>(
        prefix: &str,
        suffix: &str,
        sources: &[P],
    ) -> Result<Self, ArtifactError> {
        let mut contents = Vec::new();
        for source in sources {
            let source = source.as_ref();
            let mut part = fs::read(source).map_err(|e| ArtifactError::Read {
                path: source.to_path_buf(),
                source: e,
            })?;
            contents.append(&mut part);
        }
        Self::with_contents(prefix, suffix, &contents)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
