//! Service view.

use super::{list_at, set_port_protocol};
use crate::document::{Document, DocumentError};
use crate::value::Value;

pub const SERVICE_PORTS_PATH: &str = "spec.ports";
pub const CLUSTER_IP_PATH: &str = "spec.clusterIP";
pub const PORTAL_IP_PATH: &str = "spec.portalIP";

/// Service edits the router service.
#[derive(Debug)]
pub struct Service<'a> {
    doc: &'a mut Document,
}

impl<'a> Service<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        Service { doc }
    }

    pub fn ports(&self) -> Vec<Value> {
        list_at(self.doc, SERVICE_PORTS_PATH)
    }

    pub fn add_ports(&mut self, ports: Vec<Value>) -> Result<bool, DocumentError> {
        let mut changed = false;
        for port in ports {
            changed |= self.doc.append(SERVICE_PORTS_PATH, port)?;
        }
        Ok(changed)
    }

    /// Returns the port entry whose `port` equals `port`.
    pub fn find_port(&self, port: i64) -> Option<Value> {
        self.ports()
            .into_iter()
            .find(|p| p.get("port").and_then(Value::as_int) == Some(port))
    }

    pub fn delete_ports(&mut self, ports: &[i64]) -> Result<bool, DocumentError> {
        let mut removed = false;
        for port in ports {
            if let Some(entry) = self.find_port(*port) {
                removed |= self.doc.pop(SERVICE_PORTS_PATH, &entry)?;
            }
        }
        Ok(removed)
    }

    /// Sets `protocol` on every port.
    pub fn force_port_protocol(&mut self, protocol: &str) -> Result<bool, DocumentError> {
        set_port_protocol(self.doc, SERVICE_PORTS_PATH, protocol, false)
    }

    pub fn add_cluster_ip(&mut self, ip: &str) -> Result<bool, DocumentError> {
        self.doc.put(CLUSTER_IP_PATH, Value::from(ip))
    }

    pub fn add_portal_ip(&mut self, ip: &str) -> Result<bool, DocumentError> {
        self.doc.put(PORTAL_IP_PATH, Value::from(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    fn service_doc() -> Document {
        Document::new(
            from_json(r#"{"kind": "Service", "spec": {"ports": [{"port": 80}, {"port": 443}, {"port": 1936}]}}"#)
                .unwrap(),
        )
    }

    #[test]
    fn test_ports() {
        let mut doc = service_doc();
        let mut svc = Service::new(&mut doc);
        assert_eq!(svc.ports().len(), 3);
        assert!(svc.find_port(443).is_some());
        assert!(svc.find_port(8080).is_none());

        assert!(svc.delete_ports(&[80, 8080]).unwrap());
        assert!(svc.find_port(80).is_none());
        assert_eq!(svc.ports().len(), 2);

        assert!(svc.add_ports(vec![from_json(r#"{"port": 80}"#).unwrap()]).unwrap());
        assert_eq!(svc.ports().len(), 3);
    }

    #[test]
    fn test_force_port_protocol() {
        let mut doc = service_doc();
        let mut svc = Service::new(&mut doc);
        assert!(svc.force_port_protocol("TCP").unwrap());
        assert!(svc
            .ports()
            .iter()
            .all(|p| p.get("protocol") == Some(&Value::from("TCP"))));
    }

    #[test]
    fn test_ips() {
        let mut doc = service_doc();
        let mut svc = Service::new(&mut doc);
        assert!(svc.add_cluster_ip("172.30.0.1").unwrap());
        assert!(svc.add_portal_ip("172.30.0.1").unwrap());
        assert_eq!(doc.get(CLUSTER_IP_PATH).unwrap(), Some(&Value::from("172.30.0.1")));
    }
}
