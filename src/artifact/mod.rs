//! Artifact module - Scoped temporary files handed to the cluster CLI.
//!
//! Rendered documents, certificate bundles and the kubeconfig copy are all
//! written to [`TempArtifact`]s, which delete their file when dropped.

mod temp;

pub use temp::*;
