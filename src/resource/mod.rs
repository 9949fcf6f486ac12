//! Resource module - The typed parts of a router bundle.
//!
//! Each [`ManagedResource`] wraps a [`Document`]. The per-kind views
//! ([`DeploymentConfig`], [`Service`], ...) are thin accessors that read from
//! and edit the wrapped document directly; nothing is cached.

mod deployment;
mod kind;
mod role_binding;
mod secret;
mod service;
mod service_account;

pub use deployment::*;
pub use kind::*;
pub use role_binding::*;
pub use secret::*;
pub use service::*;
pub use service_account::*;

use crate::document::{Document, DocumentError};
use crate::value::Value;

/// ManagedResource is one kind/name part of the router bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedResource {
    pub kind: ResourceKind,
    pub name: String,
    pub document: Document,
}

impl ManagedResource {
    pub fn new(kind: ResourceKind, name: impl Into<String>, document: Document) -> Self {
        ManagedResource {
            kind,
            name: name.into(),
            document,
        }
    }

    /// Builds a resource from a document carrying `kind` and `metadata.name`.
    ///
    /// Returns None for kinds that are not part of the bundle.
    pub fn from_document(document: Document) -> Option<Self> {
        let kind = document
            .root()
            .get("kind")
            .and_then(Value::as_str)
            .and_then(ResourceKind::from_kind)?;
        let name = document
            .root()
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(ManagedResource::new(kind, name, document))
    }

    pub fn value(&self) -> &Value {
        self.document.root()
    }

    pub fn deployment(&mut self) -> Option<DeploymentConfig<'_>> {
        if self.kind == ResourceKind::DeploymentConfig {
            Some(DeploymentConfig::new(&mut self.document))
        } else {
            None
        }
    }

    pub fn service(&mut self) -> Option<Service<'_>> {
        if self.kind == ResourceKind::Service {
            Some(Service::new(&mut self.document))
        } else {
            None
        }
    }

    pub fn service_account(&mut self) -> Option<ServiceAccount<'_>> {
        if self.kind == ResourceKind::ServiceAccount {
            Some(ServiceAccount::new(&mut self.document))
        } else {
            None
        }
    }

    pub fn secret(&mut self) -> Option<Secret<'_>> {
        if self.kind == ResourceKind::Secret {
            Some(Secret::new(&mut self.document))
        } else {
            None
        }
    }

    pub fn role_binding(&mut self) -> Option<RoleBinding<'_>> {
        if self.kind == ResourceKind::ClusterRoleBinding {
            Some(RoleBinding::new(&mut self.document))
        } else {
            None
        }
    }
}

/// Returns the list at `path`, or an empty list.
fn list_at(doc: &Document, path: &str) -> Vec<Value> {
    doc.get(path)
        .ok()
        .flatten()
        .and_then(Value::as_list)
        .cloned()
        .unwrap_or_default()
}

/// Returns the `name` field of a map value.
fn name_of(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

/// Position of the first element of the list at `path` named `name`.
fn position_by_name(doc: &Document, path: &str, name: &str) -> Option<usize> {
    list_at(doc, path)
        .iter()
        .position(|v| name_of(v) == Some(name))
}

/// Removes the first element of the list at `path` named `name`.
fn remove_by_name(doc: &mut Document, path: &str, name: &str) -> Result<bool, DocumentError> {
    match position_by_name(doc, path, name) {
        Some(idx) => doc.remove(&format!("{}[{}]", path, idx)),
        None => Ok(false),
    }
}

/// Sets `protocol` on the port maps of the list at `path`.
///
/// With `only_missing` ports that already name a protocol are left alone.
fn set_port_protocol(
    doc: &mut Document,
    path: &str,
    protocol: &str,
    only_missing: bool,
) -> Result<bool, DocumentError> {
    let mut changed = false;
    for (idx, port) in list_at(doc, path).iter().enumerate() {
        if !port.is_map() || (only_missing && port.get("protocol").is_some()) {
            continue;
        }
        changed |= doc.put(&format!("{}[{}].protocol", path, idx), Value::from(protocol))?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_from_document() {
        let doc = Document::new(
            from_json(r#"{"kind": "Service", "metadata": {"name": "router"}}"#).unwrap(),
        );
        let res = ManagedResource::from_document(doc).unwrap();
        assert_eq!(res.kind, ResourceKind::Service);
        assert_eq!(res.name, "router");
    }

    #[test]
    fn test_from_document_unknown_kind() {
        let doc = Document::new(from_json(r#"{"kind": "Route"}"#).unwrap());
        assert!(ManagedResource::from_document(doc).is_none());
    }

    #[test]
    fn test_views_match_kind() {
        let mut res =
            ManagedResource::new(ResourceKind::Secret, "router-certs", Document::default());
        assert!(res.secret().is_some());
        assert!(res.service().is_none());
        assert!(res.deployment().is_none());
    }

    #[test]
    fn test_set_port_protocol_only_missing() {
        let mut doc = Document::new(
            from_json(r#"{"ports": [{"port": 80}, {"port": 53, "protocol": "UDP"}]}"#).unwrap(),
        );
        assert!(set_port_protocol(&mut doc, "ports", "TCP", true).unwrap());
        assert_eq!(
            doc.root(),
            &from_json(r#"{"ports": [{"port": 80, "protocol": "TCP"}, {"port": 53, "protocol": "UDP"}]}"#)
                .unwrap()
        );
        assert!(!set_port_protocol(&mut doc, "ports", "TCP", true).unwrap());
    }

    #[test]
    fn test_remove_by_name_first_element() {
        let mut doc = Document::new(
            from_json(r#"{"items": [{"name": "a"}, {"name": "b"}]}"#).unwrap(),
        );
        assert!(remove_by_name(&mut doc, "items", "a").unwrap());
        assert_eq!(doc.root(), &from_json(r#"{"items": [{"name": "b"}]}"#).unwrap());
    }
}
