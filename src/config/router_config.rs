//! Router parameters.

use super::Edit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_KUBECONFIG: &str = "/etc/origin/master/admin.kubeconfig";
pub const DEFAULT_ROUTER_TYPE: &str = "haproxy-router";

/// ConfigError is returned when router parameters cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid router parameters: {0}")]
    Invalid(String),
}

/// State is the requested presence of the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Present => "present",
            State::Absent => "absent",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(State::Present),
            "absent" => Ok(State::Absent),
            other => Err(format!("unknown state '{}'", other)),
        }
    }
}

/// RouterConfig holds every parameter of a router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    pub state: State,
    pub name: String,
    pub namespace: String,
    pub kubeconfig: PathBuf,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub cacert_file: Option<PathBuf>,
    pub images: Option<String>,
    pub latest_images: bool,
    pub labels: Option<Vec<String>>,
    pub ports: Vec<String>,
    pub replicas: i64,
    pub selector: Option<String>,
    pub service_account: String,
    /// Left unset so that an explicit value can be told apart from the default.
    pub router_type: Option<String>,
    pub host_network: bool,
    pub external_host: Option<String>,
    pub external_host_vserver: Option<String>,
    pub external_host_insecure: bool,
    pub external_host_partition_path: Option<String>,
    pub external_host_username: Option<String>,
    pub external_host_password: Option<String>,
    pub external_host_private_key: Option<String>,
    pub expose_metrics: bool,
    pub metrics_image: Option<String>,
    pub stats_user: Option<String>,
    pub stats_password: Option<String>,
    pub stats_port: i64,
    pub edits: Vec<Edit>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            state: State::Present,
            name: "router".to_string(),
            namespace: "default".to_string(),
            kubeconfig: PathBuf::from(DEFAULT_KUBECONFIG),
            cert_file: None,
            key_file: None,
            cacert_file: None,
            images: None,
            latest_images: false,
            labels: None,
            ports: vec!["80:80".to_string(), "443:443".to_string()],
            replicas: 1,
            selector: None,
            service_account: "router".to_string(),
            router_type: None,
            host_network: true,
            external_host: None,
            external_host_vserver: None,
            external_host_insecure: false,
            external_host_partition_path: None,
            external_host_username: None,
            external_host_password: None,
            external_host_private_key: None,
            expose_metrics: false,
            metrics_image: None,
            stats_user: None,
            stats_password: None,
            stats_port: 1936,
            edits: Vec::new(),
        }
    }
}

/// A rendered option value.
enum OptionValue<'a> {
    Str(Option<&'a str>),
    Bool(bool),
    Int(i64),
}

impl RouterConfig {
    /// Loads parameters from a YAML or JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RouterConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.is_some() && self.router_type.is_some() {
            return Err(ConfigError::Invalid(
                "parameters are mutually exclusive: router_type|images".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(ConfigError::Invalid(
                "cert_file and key_file must be given together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn router_type(&self) -> &str {
        self.router_type.as_deref().unwrap_or(DEFAULT_ROUTER_TYPE)
    }

    /// Name of the generated certificate secret.
    pub fn secret_name(&self) -> String {
        format!("{}-certs", self.name)
    }

    /// Name of the generated cluster role binding.
    pub fn role_binding_name(&self) -> String {
        format!("router-{}-role", self.name)
    }

    /// Renders the options passed to the dry-run render.
    ///
    /// Strings are only passed when non-empty; booleans and integers always.
    /// Certificate inputs, the router type and the edits are never passed.
    pub fn to_option_list(&self, default_cert: Option<&Path>) -> Vec<String> {
        let default_cert = default_cert.map(|p| p.display().to_string());
        let labels = self.labels.as_ref().map(|l| l.join(","));
        let ports = self.ports.join(",");

        let options = [
            ("default_cert", OptionValue::Str(default_cert.as_deref())),
            ("images", OptionValue::Str(self.images.as_deref())),
            ("latest_images", OptionValue::Bool(self.latest_images)),
            ("labels", OptionValue::Str(labels.as_deref())),
            ("ports", OptionValue::Str(Some(ports.as_str()))),
            ("replicas", OptionValue::Int(self.replicas)),
            ("selector", OptionValue::Str(self.selector.as_deref())),
            ("service_account", OptionValue::Str(Some(self.service_account.as_str()))),
            ("host_network", OptionValue::Bool(self.host_network)),
            ("external_host", OptionValue::Str(self.external_host.as_deref())),
            ("external_host_vserver", OptionValue::Str(self.external_host_vserver.as_deref())),
            ("external_host_insecure", OptionValue::Bool(self.external_host_insecure)),
            (
                "external_host_partition_path",
                OptionValue::Str(self.external_host_partition_path.as_deref()),
            ),
            ("external_host_username", OptionValue::Str(self.external_host_username.as_deref())),
            ("external_host_password", OptionValue::Str(self.external_host_password.as_deref())),
            (
                "external_host_private_key",
                OptionValue::Str(self.external_host_private_key.as_deref()),
            ),
            ("expose_metrics", OptionValue::Bool(self.expose_metrics)),
            ("metrics_image", OptionValue::Str(self.metrics_image.as_deref())),
            ("stats_user", OptionValue::Str(self.stats_user.as_deref())),
            ("stats_password", OptionValue::Str(self.stats_password.as_deref())),
            ("stats_port", OptionValue::Int(self.stats_port)),
        ];

        options
            .into_iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    OptionValue::Str(Some(s)) if !s.is_empty() => s.to_string(),
                    OptionValue::Str(_) => return None,
                    OptionValue::Bool(b) => b.to_string(),
                    OptionValue::Int(i) => i.to_string(),
                };
                Some(format!("--{}={}", key.replace('_', "-"), rendered))
            })
            .collect()
    }
}
