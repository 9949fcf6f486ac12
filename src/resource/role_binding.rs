//! Cluster role binding view.

use super::list_at;
use crate::document::{Document, DocumentError};
use crate::value::Value;

pub const SUBJECTS_PATH: &str = "subjects";
pub const ROLE_REF_PATH: &str = "roleRef";
pub const GROUP_NAMES_PATH: &str = "groupNames";
pub const USER_NAMES_PATH: &str = "userNames";

/// RoleBinding edits the router's cluster role binding.
#[derive(Debug)]
pub struct RoleBinding<'a> {
    doc: &'a mut Document,
}

impl<'a> RoleBinding<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        RoleBinding { doc }
    }

    pub fn subjects(&self) -> Vec<Value> {
        list_at(self.doc, SUBJECTS_PATH)
    }

    pub fn group_names(&self) -> Vec<Value> {
        list_at(self.doc, GROUP_NAMES_PATH)
    }

    pub fn user_names(&self) -> Vec<Value> {
        list_at(self.doc, USER_NAMES_PATH)
    }

    pub fn role_ref(&self) -> Option<Value> {
        self.doc.get(ROLE_REF_PATH).ok().flatten().cloned()
    }

    pub fn find_subject(&self, subject: &Value) -> bool {
        self.subjects().contains(subject)
    }

    pub fn find_group_name(&self, name: &str) -> bool {
        self.group_names().contains(&Value::from(name))
    }

    pub fn find_user_name(&self, name: &str) -> bool {
        self.user_names().contains(&Value::from(name))
    }

    /// Adds `subject` unless an equal subject is already bound.
    pub fn add_subject(&mut self, subject: Value) -> Result<bool, DocumentError> {
        if self.find_subject(&subject) {
            return Ok(false);
        }
        self.doc.append(SUBJECTS_PATH, subject)
    }

    pub fn add_group_name(&mut self, name: &str) -> Result<bool, DocumentError> {
        if self.find_group_name(name) {
            return Ok(false);
        }
        self.doc.append(GROUP_NAMES_PATH, Value::from(name))
    }

    pub fn add_user_name(&mut self, name: &str) -> Result<bool, DocumentError> {
        if self.find_user_name(name) {
            return Ok(false);
        }
        self.doc.append(USER_NAMES_PATH, Value::from(name))
    }

    pub fn update_role_ref(&mut self, role_ref: Value) -> Result<bool, DocumentError> {
        self.doc.put(ROLE_REF_PATH, role_ref)
    }

    pub fn remove_subject(&mut self, subject: &Value) -> Result<bool, DocumentError> {
        self.doc.pop(SUBJECTS_PATH, subject)
    }

    pub fn remove_group_name(&mut self, name: &str) -> Result<bool, DocumentError> {
        self.doc.pop(GROUP_NAMES_PATH, &Value::from(name))
    }

    pub fn remove_user_name(&mut self, name: &str) -> Result<bool, DocumentError> {
        self.doc.pop(USER_NAMES_PATH, &Value::from(name))
    }

    pub fn remove_role_ref(&mut self) -> Result<bool, DocumentError> {
        self.doc.remove(ROLE_REF_PATH)
    }
}
