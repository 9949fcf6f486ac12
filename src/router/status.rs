//! Reconciliation results.

use crate::cli::CliOutput;
use crate::config::State;
use serde::Serialize;
use std::fmt;

/// Action is the transition chosen by a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    NoOp,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::NoOp => "no-op",
        }
    }

    fn check_mode_message(self) -> String {
        let article = if self == Action::Update { "an" } else { "a" };
        format!("CHECK_MODE: Would have performed {} {}.", article, self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status is the outcome of a successful pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub changed: bool,
    pub state: State,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<CliOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Status {
    pub fn unchanged(state: State) -> Self {
        Status {
            changed: false,
            state,
            results: Vec::new(),
            msg: None,
        }
    }

    pub fn changed(state: State, results: Vec<CliOutput>) -> Self {
        Status {
            changed: true,
            state,
            results,
            msg: None,
        }
    }

    /// Reports what `action` would have done.
    pub fn check_mode(state: State, action: Action) -> Self {
        Status {
            changed: true,
            state,
            results: Vec::new(),
            msg: Some(action.check_mode_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn test_check_mode_messages() {
        assert_eq!(
            Status::check_mode(State::Present, Action::Create).msg.as_deref(),
            Some("CHECK_MODE: Would have performed a create.")
        );
        assert_eq!(
            Status::check_mode(State::Present, Action::Update).msg.as_deref(),
            Some("CHECK_MODE: Would have performed an update.")
        );
        assert_eq!(
            Status::check_mode(State::Absent, Action::Delete).msg.as_deref(),
            Some("CHECK_MODE: Would have performed a delete.")
        );
    }

    #[test]
    fn test_serialize_unchanged() {
        let json = serde_json::to_string(&Status::unchanged(State::Absent)).unwrap();
        assert_eq!(
            from_json(&json).unwrap(),
            from_json(r#"{"changed": false, "state": "absent"}"#).unwrap()
        );
    }
}
