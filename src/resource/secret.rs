//! Secret view.

use crate::document::{Document, DocumentError};
use crate::value::{Map, Value};

pub const DATA_PATH: &str = "data";

/// Secret edits the `data` entries of the router certificate secret.
///
/// Data keys such as `tls.crt` contain the path separator, so entries are
/// always edited through the `data` map rather than addressed by path.
#[derive(Debug)]
pub struct Secret<'a> {
    doc: &'a mut Document,
}

impl<'a> Secret<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        Secret { doc }
    }

    pub fn secrets(&self) -> Map {
        self.doc
            .get(DATA_PATH)
            .ok()
            .flatten()
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn find_secret(&self, key: &str) -> Option<Value> {
        self.secrets().get(key).cloned()
    }

    pub fn add_secret(&mut self, key: &str, value: Value) -> Result<bool, DocumentError> {
        let mut entry = Map::new();
        entry.set(key, value);
        if self.doc.get(DATA_PATH)?.is_some_and(Value::is_map) {
            self.doc.update(DATA_PATH, Value::Map(entry), None, None)
        } else {
            self.doc.put(DATA_PATH, Value::Map(entry))
        }
    }

    /// Replaces an existing entry; returns false when `key` is absent.
    pub fn update_secret(&mut self, key: &str, value: Value) -> Result<bool, DocumentError> {
        match self.find_secret(key) {
            Some(current) if current == value => Ok(false),
            Some(_) => self.add_secret(key, value),
            None => Ok(false),
        }
    }

    pub fn delete_secret(&mut self, key: &str) -> Result<bool, DocumentError> {
        self.doc.pop(DATA_PATH, &Value::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_secret_entries() {
        let mut doc = Document::new(from_json(r#"{"kind": "Secret"}"#).unwrap());
        let mut secret = Secret::new(&mut doc);
        assert!(secret.secrets().is_empty());

        assert!(secret.add_secret("tls.crt", Value::from("Y2VydA==")).unwrap());
        assert!(secret.add_secret("tls.key", Value::from("a2V5")).unwrap());
        assert_eq!(secret.secrets().len(), 2);
        assert_eq!(secret.find_secret("tls.crt"), Some(Value::from("Y2VydA==")));

        assert!(!secret.update_secret("tls.crt", Value::from("Y2VydA==")).unwrap());
        assert!(secret.update_secret("tls.crt", Value::from("bmV3")).unwrap());
        assert!(!secret.update_secret("missing", Value::from("x")).unwrap());

        assert!(secret.delete_secret("tls.key").unwrap());
        assert!(!secret.delete_secret("tls.key").unwrap());
        assert_eq!(secret.secrets().len(), 1);
    }
}
