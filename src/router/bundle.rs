//! The set of managed parts making up a router.

use crate::document::Document;
use crate::resource::{ManagedResource, ResourceKind};
use crate::value::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Part is one kind/name pair managed as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub kind: ResourceKind,
    pub name: String,
}

impl Part {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Part {
            kind,
            name: name.into(),
        }
    }
}

/// Bundle holds at most one resource per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    resources: BTreeMap<ResourceKind, ManagedResource>,
}

impl Bundle {
    pub fn new() -> Self {
        Bundle::default()
    }

    /// Builds a bundle from rendered documents. Kinds outside the bundle are
    /// dropped; for repeated kinds the last document wins.
    pub fn from_items(items: Vec<Value>) -> Self {
        let mut bundle = Bundle::new();
        for item in items {
            match ManagedResource::from_document(Document::new(item)) {
                Some(resource) => bundle.insert(resource),
                None => debug!("ignoring rendered document of unmanaged kind"),
            }
        }
        bundle
    }

    pub fn insert(&mut self, resource: ManagedResource) {
        self.resources.insert(resource.kind, resource);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&ManagedResource> {
        self.resources.get(&kind)
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> Option<&mut ManagedResource> {
        self.resources.get_mut(&kind)
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.resources.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedResource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Reports whether the router is deployed: the deployment config, the
    /// service, the certificate secret and the service account must all be
    /// present. The role binding is not required.
    pub fn exists(&self) -> bool {
        [
            ResourceKind::DeploymentConfig,
            ResourceKind::Service,
            ResourceKind::Secret,
            ResourceKind::ServiceAccount,
        ]
        .into_iter()
        .all(|kind| self.contains(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_from_items() {
        let items = from_json(
            r#"[
                {"kind": "DeploymentConfig", "metadata": {"name": "router"}},
                {"kind": "Route", "metadata": {"name": "router"}},
                {"kind": "Service", "metadata": {"name": "router"}}
            ]"#,
        )
        .unwrap();
        let bundle = Bundle::from_items(items.as_list().unwrap().clone());
        assert_eq!(bundle.len(), 2);
        assert!(bundle.contains(ResourceKind::Service));
        assert_eq!(bundle.get(ResourceKind::DeploymentConfig).unwrap().name, "router");
    }

    #[test]
    fn test_exists_ignores_role_binding() {
        let mut bundle = Bundle::new();
        for kind in [
            ResourceKind::DeploymentConfig,
            ResourceKind::Service,
            ResourceKind::Secret,
        ] {
            bundle.insert(ManagedResource::new(kind, "router", Document::default()));
        }
        assert!(!bundle.exists());

        bundle.insert(ManagedResource::new(
            ResourceKind::ServiceAccount,
            "router",
            Document::default(),
        ));
        assert!(bundle.exists());
        assert!(!bundle.contains(ResourceKind::ClusterRoleBinding));
    }
}
