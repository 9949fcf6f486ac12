//! Subprocess implementation of [`ClusterClient`].

use super::{CliError, CliOutput, ClusterClient};
use crate::artifact::TempArtifact;
use crate::resource::ResourceKind;
use crate::value::{self, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// How the stdout of a command is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Ignore,
    Json,
}

/// OcClient runs `oc`/`oadm` against one namespace.
///
/// Every command sees `KUBECONFIG` pointing at a private copy of the
/// configured kubeconfig, removed when the client is dropped.
#[derive(Debug)]
pub struct OcClient {
    namespace: Option<String>,
    kubeconfig: TempArtifact,
    oc: String,
    oadm: String,
}

impl OcClient {
    pub fn new(namespace: impl Into<String>, kubeconfig: &Path) -> Result<Self, CliError> {
        let namespace = namespace.into();
        // "none" and "empty" mean cluster scoped.
        let namespace = match namespace.to_lowercase().as_str() {
            "" | "none" | "empty" => None,
            _ => Some(namespace),
        };
        Ok(OcClient {
            namespace,
            kubeconfig: TempArtifact::copy_of("kubeconfig-", kubeconfig)?,
            oc: "oc".to_string(),
            oadm: "oadm".to_string(),
        })
    }

    /// Overrides the `oc` and `oadm` executables.
    pub fn with_binaries(mut self, oc: impl Into<String>, oadm: impl Into<String>) -> Self {
        self.oc = oc.into();
        self.oadm = oadm.into();
        self
    }

    fn command_line(&self, binary: &str, args: &[String]) -> Vec<String> {
        let mut cmd = vec![binary.to_string()];
        if let Some(ns) = &self.namespace {
            cmd.push("-n".to_string());
            cmd.push(ns.clone());
        }
        cmd.extend(args.iter().cloned());
        cmd
    }

    fn run(&self, binary: &str, args: &[String], output: Output) -> Result<CliOutput, CliError> {
        let cmd = self.command_line(binary, args);
        let cmd_str = cmd.join(" ");
        debug!(cmd = %cmd_str, "running cluster command");

        let out = Command::new(&cmd[0])
            .args(&cmd[1..])
            .env("KUBECONFIG", self.kubeconfig.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CliError::Spawn {
                cmd: cmd_str.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
        trace!(%stdout, %stderr, "command output");

        Ok(decode(cmd_str, out.status.code().unwrap_or(-1), stdout, stderr, output))
    }
}

/// Builds the [`CliOutput`] for a finished command.
fn decode(
    cmd: String,
    returncode: i32,
    stdout: String,
    stderr: String,
    output: Output,
) -> CliOutput {
    let mut result = CliOutput {
        returncode,
        cmd,
        results: Value::Null,
        ..Default::default()
    };

    if returncode != 0 {
        result.results = Value::Map(Default::default());
    } else if output == Output::Json {
        match value::from_json(&stdout) {
            Ok(parsed) => result.results = parsed,
            Err(e) => {
                debug!(cmd = %result.cmd, error = %e, "command output is not JSON");
                result.decode_error = Some(e.to_string());
            }
        }
    }

    result.stdout = stdout;
    result.stderr = stderr;
    result
}

fn selector_or_name(args: &mut Vec<String>, name: &str, selector: Option<&str>) {
    match selector {
        Some(selector) => args.push(format!("--selector={}", selector)),
        None if !name.is_empty() => args.push(name.to_string()),
        None => {}
    }
}

impl ClusterClient for OcClient {
    fn render_router(&self, name: &str, options: &[String]) -> Result<CliOutput, CliError> {
        let mut args = vec!["router".to_string(), name.to_string()];
        args.extend(options.iter().cloned());
        args.extend(["--dry-run=true", "-o", "json"].map(String::from));
        self.run(&self.oadm, &args, Output::Json)
    }

    fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        selector: Option<&str>,
    ) -> Result<CliOutput, CliError> {
        let mut args = vec!["get".to_string(), kind.cli_name().to_string()];
        selector_or_name(&mut args, name, selector);
        args.extend(["-o", "json"].map(String::from));
        Ok(self.run(&self.oc, &args, Output::Json)?.into_list())
    }

    fn create(&self, file: &Path) -> Result<CliOutput, CliError> {
        let args = vec!["create".to_string(), "-f".to_string(), file.display().to_string()];
        self.run(&self.oc, &args, Output::Ignore)
    }

    fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
        selector: Option<&str>,
    ) -> Result<CliOutput, CliError> {
        let mut args = vec!["delete".to_string(), kind.cli_name().to_string(), name.to_string()];
        if let Some(selector) = selector {
            args.push(format!("--selector={}", selector));
        }
        self.run(&self.oc, &args, Output::Ignore)
    }

    fn replace(&self, file: &Path, force: bool) -> Result<CliOutput, CliError> {
        let mut args = vec!["replace".to_string(), "-f".to_string(), file.display().to_string()];
        if force {
            args.push("--force".to_string());
        }
        self.run(&self.oc, &args, Output::Ignore)
    }

    fn process(
        &self,
        template: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<CliOutput, CliError> {
        let mut args = vec!["process".to_string(), template.to_string()];
        if !params.is_empty() {
            args.push("-v".to_string());
            args.extend(params.iter().map(|(k, v)| format!("{}={}", k, v)));
        }
        self.run(&self.oc, &args, Output::Json)
    }
}
