//! Deployment config view.

use super::{list_at, name_of, position_by_name, remove_by_name, set_port_protocol};
use crate::document::{Document, DocumentError};
use crate::value::{Map, Value};

pub const REPLICAS_PATH: &str = "spec.replicas";
pub const CONTAINERS_PATH: &str = "spec.template.spec.containers";
pub const ENV_PATH: &str = "spec.template.spec.containers[0].env";
pub const CONTAINER_PORTS_PATH: &str = "spec.template.spec.containers[0].ports";
pub const VOLUMES_PATH: &str = "spec.template.spec.volumes";
pub const VOLUME_MOUNTS_PATH: &str = "spec.template.spec.containers[0].volumeMounts";

/// DeploymentConfig edits the router deployment. Container accessors address
/// the first container of the pod template.
#[derive(Debug)]
pub struct DeploymentConfig<'a> {
    doc: &'a mut Document,
}

fn env_entry(name: &str, value: Value) -> Value {
    let mut entry = Map::new();
    entry.set("name", Value::from(name));
    entry.set("value", value);
    Value::Map(entry)
}

impl<'a> DeploymentConfig<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        DeploymentConfig { doc }
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn env_vars(&self) -> Vec<Value> {
        list_at(self.doc, ENV_PATH)
    }

    /// Returns the `value` of the env var named `name`.
    pub fn env_value(&self, name: &str) -> Option<Value> {
        self.env_vars()
            .into_iter()
            .find(|e| name_of(e) == Some(name))
            .and_then(|e| e.get("value").cloned())
    }

    pub fn add_env_value(&mut self, name: &str, value: Value) -> Result<bool, DocumentError> {
        self.doc.append(ENV_PATH, env_entry(name, value))
    }

    pub fn exists_env_key(&self, name: &str) -> bool {
        position_by_name(self.doc, ENV_PATH, name).is_some()
    }

    pub fn exists_env_value(&self, name: &str, value: &Value) -> bool {
        self.env_vars()
            .iter()
            .any(|e| name_of(e) == Some(name) && e.get("value") == Some(value))
    }

    /// Sets the env var `name` to `value`, adding it when absent.
    pub fn update_env_var(&mut self, name: &str, value: Value) -> Result<bool, DocumentError> {
        match position_by_name(self.doc, ENV_PATH, name) {
            Some(idx) => self.doc.put(&format!("{}[{}].value", ENV_PATH, idx), value),
            None => self.add_env_value(name, value),
        }
    }

    /// Deletes every env var named in `names`.
    pub fn delete_env_var(&mut self, names: &[&str]) -> Result<bool, DocumentError> {
        let mut modified = false;
        for name in names {
            modified |= remove_by_name(self.doc, ENV_PATH, name)?;
        }
        Ok(modified)
    }

    pub fn replicas(&self) -> Option<i64> {
        self.doc.get(REPLICAS_PATH).ok().flatten().and_then(Value::as_int)
    }

    pub fn update_replicas(&mut self, replicas: i64) -> Result<bool, DocumentError> {
        self.doc.put(REPLICAS_PATH, Value::Int(replicas))
    }

    pub fn needs_update_replicas(&self, replicas: i64) -> bool {
        self.replicas() != Some(replicas)
    }

    pub fn container_ports(&self) -> Vec<Value> {
        list_at(self.doc, CONTAINER_PORTS_PATH)
    }

    /// Adds `protocol` to container ports that do not name one.
    pub fn default_port_protocol(&mut self, protocol: &str) -> Result<bool, DocumentError> {
        set_port_protocol(self.doc, CONTAINER_PORTS_PATH, protocol, true)
    }

    pub fn volumes(&self) -> Vec<Value> {
        list_at(self.doc, VOLUMES_PATH)
    }

    pub fn volume_mounts(&self) -> Vec<Value> {
        list_at(self.doc, VOLUME_MOUNTS_PATH)
    }

    fn volume_path(mounts: bool) -> &'static str {
        if mounts {
            VOLUME_MOUNTS_PATH
        } else {
            VOLUMES_PATH
        }
    }

    pub fn find_volume_by_name(&self, name: &str, mounts: bool) -> Option<Value> {
        list_at(self.doc, Self::volume_path(mounts))
            .into_iter()
            .find(|v| name_of(v) == Some(name))
    }

    pub fn exists_volume(&self, name: &str) -> bool {
        self.find_volume_by_name(name, false).is_some()
    }

    pub fn exists_volume_mount(&self, name: &str) -> bool {
        self.find_volume_by_name(name, true).is_some()
    }

    pub fn add_volume(&mut self, volume: Value) -> Result<bool, DocumentError> {
        self.doc.append(VOLUMES_PATH, volume)
    }

    pub fn add_volume_mount(&mut self, volume_mount: Value) -> Result<bool, DocumentError> {
        self.doc.append(VOLUME_MOUNTS_PATH, volume_mount)
    }

    /// Removes the volume named `name` together with its mount.
    pub fn delete_volume_by_name(&mut self, name: &str) -> Result<bool, DocumentError> {
        let volume = remove_by_name(self.doc, VOLUMES_PATH, name)?;
        let mount = remove_by_name(self.doc, VOLUME_MOUNTS_PATH, name)?;
        Ok(volume || mount)
    }

    /// Replaces the volume with the same name, adding it when absent.
    pub fn update_volume(&mut self, volume: Value) -> Result<bool, DocumentError> {
        self.replace_named(VOLUMES_PATH, volume)
    }

    /// Replaces the volume mount with the same name, adding it when absent.
    pub fn update_volume_mount(&mut self, volume_mount: Value) -> Result<bool, DocumentError> {
        self.replace_named(VOLUME_MOUNTS_PATH, volume_mount)
    }

    fn replace_named(&mut self, path: &str, item: Value) -> Result<bool, DocumentError> {
        let position = name_of(&item).and_then(|name| position_by_name(self.doc, path, name));
        match position {
            Some(idx) => self.doc.put(&format!("{}[{}]", path, idx), item),
            None => self.doc.append(path, item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    fn deployment_doc() -> Document {
        Document::new(
            from_json(
                r#"{
                    "kind": "DeploymentConfig",
                    "spec": {
                        "replicas": 1,
                        "template": {"spec": {
                            "containers": [{
                                "name": "router",
                                "env": [
                                    {"name": "STATS_PASSWORD", "value": "abc"},
                                    {"name": "ROUTER_SERVICE_NAME", "value": "router"}
                                ],
                                "ports": [{"containerPort": 80}, {"containerPort": 1936, "protocol": "TCP"}],
                                "volumeMounts": [{"name": "server-certificate", "mountPath": "/etc/pki/tls/private"}]
                            }],
                            "volumes": [{"name": "server-certificate", "secret": {"secretName": "router-certs"}}]
                        }}
                    }
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_env_accessors() {
        let mut doc = deployment_doc();
        let dc = DeploymentConfig::new(&mut doc);
        assert_eq!(dc.env_vars().len(), 2);
        assert_eq!(dc.env_value("STATS_PASSWORD"), Some(Value::from("abc")));
        assert!(dc.exists_env_key("ROUTER_SERVICE_NAME"));
        assert!(dc.exists_env_value("ROUTER_SERVICE_NAME", &Value::from("router")));
        assert!(!dc.exists_env_value("ROUTER_SERVICE_NAME", &Value::from("other")));
    }

    #[test]
    fn test_update_env_var_at_index_zero() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.update_env_var("STATS_PASSWORD", Value::from("xyz")).unwrap());
        assert_eq!(dc.env_value("STATS_PASSWORD"), Some(Value::from("xyz")));
        assert_eq!(dc.env_vars().len(), 2);
    }

    #[test]
    fn test_update_env_var_adds_missing() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.update_env_var("EXTENDED_VALIDATION", Value::from("false")).unwrap());
        assert_eq!(dc.env_vars().len(), 3);
    }

    #[test]
    fn test_add_env_value_creates_list() {
        let mut doc = Document::default();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(!dc.add_env_value("A", Value::from("1")).unwrap());

        let mut doc = Document::new(
            from_json(r#"{"spec": {"template": {"spec": {"containers": [{"name": "c"}]}}}}"#).unwrap(),
        );
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.add_env_value("A", Value::from("1")).unwrap());
        assert_eq!(dc.env_value("A"), Some(Value::from("1")));
    }

    #[test]
    fn test_delete_env_var_first_entry() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.delete_env_var(&["STATS_PASSWORD"]).unwrap());
        assert!(!dc.exists_env_key("STATS_PASSWORD"));
        assert!(!dc.delete_env_var(&["STATS_PASSWORD"]).unwrap());
    }

    #[test]
    fn test_replicas() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert_eq!(dc.replicas(), Some(1));
        assert!(dc.needs_update_replicas(2));
        assert!(dc.update_replicas(2).unwrap());
        assert!(!dc.needs_update_replicas(2));
    }

    #[test]
    fn test_default_port_protocol() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.default_port_protocol("TCP").unwrap());
        assert!(dc
            .container_ports()
            .iter()
            .all(|p| p.get("protocol") == Some(&Value::from("TCP"))));
    }

    #[test]
    fn test_volumes() {
        let mut doc = deployment_doc();
        let mut dc = DeploymentConfig::new(&mut doc);
        assert!(dc.exists_volume("server-certificate"));
        assert!(dc.exists_volume_mount("server-certificate"));

        let updated = from_json(r#"{"name": "server-certificate", "secret": {"secretName": "other"}}"#).unwrap();
        assert!(dc.update_volume(updated.clone()).unwrap());
        assert_eq!(dc.find_volume_by_name("server-certificate", false), Some(updated));
        assert_eq!(dc.volumes().len(), 1);

        assert!(dc.add_volume(from_json(r#"{"name": "extra", "emptyDir": {}}"#).unwrap()).unwrap());
        assert_eq!(dc.volumes().len(), 2);

        assert!(dc.delete_volume_by_name("server-certificate").unwrap());
        assert!(!dc.exists_volume("server-certificate"));
        assert!(!dc.exists_volume_mount("server-certificate"));
    }
}
