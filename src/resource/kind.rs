//! Resource kinds managed as part of a router.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ResourceKind identifies one of the object kinds in a router bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    DeploymentConfig,
    Service,
    ServiceAccount,
    Secret,
    ClusterRoleBinding,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::DeploymentConfig,
        ResourceKind::Service,
        ResourceKind::ServiceAccount,
        ResourceKind::Secret,
        ResourceKind::ClusterRoleBinding,
    ];

    /// The `kind` field value of objects of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::DeploymentConfig => "DeploymentConfig",
            ResourceKind::Service => "Service",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Secret => "Secret",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
        }
    }

    /// The resource name used on the cluster CLI command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            ResourceKind::DeploymentConfig => "dc",
            ResourceKind::Service => "svc",
            ResourceKind::ServiceAccount => "sa",
            ResourceKind::Secret => "secret",
            ResourceKind::ClusterRoleBinding => "clusterrolebinding",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        ResourceKind::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
