//! Declarative document edits.

use crate::document::{Document, DocumentError};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// EditAction selects the document operation an [`Edit`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Put,
    Update,
    Append,
}

/// Edit is one change to apply to a rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub action: EditAction,
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_value: Option<Value>,
}

impl Edit {
    pub fn put(key: impl Into<String>, value: Value) -> Self {
        Edit {
            action: EditAction::Put,
            key: key.into(),
            value,
            index: None,
            curr_value: None,
        }
    }

    pub fn update(key: impl Into<String>, value: Value) -> Self {
        Edit {
            action: EditAction::Update,
            ..Edit::put(key, value)
        }
    }

    pub fn append(key: impl Into<String>, value: Value) -> Self {
        Edit {
            action: EditAction::Append,
            ..Edit::put(key, value)
        }
    }

    /// Applies the edit, reporting whether `doc` changed.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, DocumentError> {
        match self.action {
            EditAction::Put => doc.put(&self.key, self.value.clone()),
            EditAction::Update => doc.update(
                &self.key,
                self.value.clone(),
                self.index,
                self.curr_value.as_ref(),
            ),
            EditAction::Append => doc.append(&self.key, self.value.clone()),
        }
    }
}
