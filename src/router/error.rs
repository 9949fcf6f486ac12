//! Reconciliation errors.

use crate::artifact::ArtifactError;
use crate::cli::{CliError, CliOutput};
use crate::document::DocumentError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// RouterError aborts a reconciliation pass.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("could not render router: {0}")]
    RenderingFailed(String),

    #[error("edits were requested but none of them changed the deployment config")]
    EditsMadeNoChange,

    #[error(transparent)]
    Collaborator(#[from] CliError),

    #[error("{action} failed: {}", summarize(.outputs))]
    PartsFailed {
        action: &'static str,
        outputs: Vec<CliOutput>,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("cannot read certificate {}: {source}", path.display())]
    Certificate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RouterError {
    /// Command results gathered before the pass failed.
    pub fn results(&self) -> &[CliOutput] {
        match self {
            RouterError::PartsFailed { outputs, .. } => outputs,
            _ => &[],
        }
    }
}

fn summarize(outputs: &[CliOutput]) -> String {
    outputs
        .iter()
        .filter(|o| !o.success())
        .map(|o| format!("'{}': {}", o.cmd, o.stderr.trim()))
        .collect::<Vec<_>>()
        .join("; ")
}
