//! Collaborator trait and command results.

use crate::resource::ResourceKind;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use thiserror::Error;

/// CliError is a failure to run a command at all. Non-zero exits are
/// reported through [`CliOutput`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to execute '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot prepare kubeconfig: {0}")]
    Kubeconfig(#[from] crate::artifact::ArtifactError),
}

/// CliOutput is the captured result of one collaborator command.
///
/// A non-zero exit is not an error at this level: callers decide which
/// failures they tolerate by looking at `stderr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CliOutput {
    pub returncode: i32,
    pub cmd: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    pub results: Value,
    /// Set when the command succeeded but its JSON output did not parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl CliOutput {
    pub fn success(&self) -> bool {
        self.returncode == 0
    }

    /// Reports whether the command failed with `needle` in its stderr.
    pub fn failed_with(&self, needle: &str) -> bool {
        !self.success() && self.stderr.contains(needle)
    }

    /// Returns the results as a list of documents.
    ///
    /// An `items` list is unwrapped and a single document becomes a list of
    /// one.
    pub fn result_list(&self) -> Vec<Value> {
        match &self.results {
            Value::Map(map) if map.has("items") => map
                .get("items")
                .and_then(Value::as_list)
                .cloned()
                .unwrap_or_default(),
            Value::List(list) => list.clone(),
            other => vec![other.clone()],
        }
    }

    /// Normalizes `results` into the list form of [`CliOutput::result_list`].
    pub fn into_list(mut self) -> Self {
        self.results = Value::List(self.result_list());
        self
    }
}

/// ClusterClient is the set of cluster operations the controller relies on.
pub trait ClusterClient {
    /// Renders the router bundle named `name` without submitting it.
    fn render_router(&self, name: &str, options: &[String]) -> Result<CliOutput, CliError>;

    /// Fetches resources by name, or by label selector when one is given.
    /// Results are always a list.
    fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        selector: Option<&str>,
    ) -> Result<CliOutput, CliError>;

    /// Creates the resources described by `file`.
    fn create(&self, file: &Path) -> Result<CliOutput, CliError>;

    fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
        selector: Option<&str>,
    ) -> Result<CliOutput, CliError>;

    fn replace(&self, file: &Path, force: bool) -> Result<CliOutput, CliError>;

    /// Processes a template with `key=value` parameters.
    fn process(
        &self,
        template: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<CliOutput, CliError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_result_list_unwraps_items() {
        let out = CliOutput {
            results: from_json(r#"{"kind": "List", "items": [{"kind": "Service"}, {"kind": "Secret"}]}"#).unwrap(),
            ..Default::default()
        };
        assert_eq!(out.result_list().len(), 2);
    }

    #[test]
    fn test_result_list_wraps_single() {
        let out = CliOutput {
            results: from_json(r#"{"kind": "Service"}"#).unwrap(),
            ..Default::default()
        };
        let out = out.into_list();
        assert_eq!(out.results, from_json(r#"[{"kind": "Service"}]"#).unwrap());
    }

    #[test]
    fn test_failed_with() {
        let out = CliOutput {
            returncode: 1,
            stderr: "Error from server: services \"router\" already exists".to_string(),
            ..Default::default()
        };
        assert!(out.failed_with("already exist"));
        assert!(!out.failed_with("not found"));
        assert!(!out.success());
    }
}
