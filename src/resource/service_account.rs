//! Service account view.

use super::{list_at, name_of, remove_by_name};
use crate::document::{Document, DocumentError};
use crate::value::{Map, Value};

pub const SECRETS_PATH: &str = "secrets";
pub const IMAGE_PULL_SECRETS_PATH: &str = "imagePullSecrets";

/// ServiceAccount edits the secret references of the router service account.
#[derive(Debug)]
pub struct ServiceAccount<'a> {
    doc: &'a mut Document,
}

fn secret_ref(name: &str) -> Value {
    let mut entry = Map::new();
    entry.set("name", Value::from(name));
    Value::Map(entry)
}

impl<'a> ServiceAccount<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        ServiceAccount { doc }
    }

    pub fn secrets(&self) -> Vec<Value> {
        list_at(self.doc, SECRETS_PATH)
    }

    pub fn image_pull_secrets(&self) -> Vec<Value> {
        list_at(self.doc, IMAGE_PULL_SECRETS_PATH)
    }

    pub fn find_secret(&self, name: &str) -> Option<Value> {
        self.secrets().into_iter().find(|s| name_of(s) == Some(name))
    }

    pub fn find_image_pull_secret(&self, name: &str) -> Option<Value> {
        self.image_pull_secrets()
            .into_iter()
            .find(|s| name_of(s) == Some(name))
    }

    pub fn add_secret(&mut self, name: &str) -> Result<bool, DocumentError> {
        self.doc.append(SECRETS_PATH, secret_ref(name))
    }

    pub fn add_image_pull_secret(&mut self, name: &str) -> Result<bool, DocumentError> {
        self.doc.append(IMAGE_PULL_SECRETS_PATH, secret_ref(name))
    }

    pub fn delete_secret(&mut self, name: &str) -> Result<bool, DocumentError> {
        remove_by_name(self.doc, SECRETS_PATH, name)
    }

    pub fn delete_image_pull_secret(&mut self, name: &str) -> Result<bool, DocumentError> {
        remove_by_name(self.doc, IMAGE_PULL_SECRETS_PATH, name)
    }
}
