use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::Value;

/// Key/value mapping tested against fields of the current user.
pub type Criteria = BTreeMap<String, Value>;

/// Parameters handed to the reader collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadParams {
    /// Identifier of the user to load.
    pub id: i64,
}

/// Instructions understood by the interpreter.
///
/// Actions are pure data. Only [`Action::Match`] has children, so a program is
/// a flat list of trees whose inner nodes are all matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Load a user through the reader and make it the current user.
    Read {
        /// Lookup parameters.
        params: ReadParams,
    },
    /// Compare the current user against `criteria` and run one continuation.
    Match {
        /// Expected field values; every entry must hold.
        #[serde(default)]
        criteria: Criteria,
        /// Executed when every criterion holds.
        #[serde(
            rename = "onSuccess",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        on_success: Option<Box<Action>>,
        /// Executed when any criterion fails.
        #[serde(rename = "onFail", default, skip_serializing_if = "Option::is_none")]
        on_fail: Option<Box<Action>>,
    },
    /// Log a field of the current user, or the key itself when it names no field.
    Log {
        /// Field name to log.
        key: String,
    },
    /// Do nothing.
    Noop,
}

impl Action {
    /// Tags accepted in serialized programs.
    pub const KINDS: [&'static str; 4] = ["read", "match", "log", "noop"];

    /// `read` action for the given user id.
    pub fn read(id: i64) -> Self {
        Action::Read {
            params: ReadParams { id },
        }
    }

    /// `match` action with optional continuations.
    pub fn matching(
        criteria: Criteria,
        on_success: Option<Action>,
        on_fail: Option<Action>,
    ) -> Self {
        Action::Match {
            criteria,
            on_success: on_success.map(Box::new),
            on_fail: on_fail.map(Box::new),
        }
    }

    /// `log` action for the given key.
    pub fn log(key: impl Into<String>) -> Self {
        Action::Log { key: key.into() }
    }

    /// `noop` action.
    pub fn noop() -> Self {
        Action::Noop
    }

    /// Serialized tag of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Read { .. } => "read",
            Action::Match { .. } => "match",
            Action::Log { .. } => "log",
            Action::Noop => "noop",
        }
    }

    /// Number of nodes on the longest path from this action to a leaf.
    pub fn depth(&self) -> usize {
        match self {
            Action::Match {
                on_success,
                on_fail,
                ..
            } => {
                let success = on_success.as_deref().map_or(0, Action::depth);
                let fail = on_fail.as_deref().map_or(0, Action::depth);
                1 + success.max(fail)
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_is(name: &str) -> Criteria {
        let mut criteria = Criteria::new();
        criteria.insert("name".into(), Value::from(name));
        criteria
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case_children() {
        let action = Action::matching(
            name_is("marcus"),
            Some(Action::log("age")),
            Some(Action::noop()),
        );
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "match",
                "criteria": {"name": "marcus"},
                "onSuccess": {"type": "log", "key": "age"},
                "onFail": {"type": "noop"},
            })
        );
    }

    #[test]
    fn missing_continuations_are_omitted() {
        let json = serde_json::to_value(Action::matching(Criteria::new(), None, None)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "match", "criteria": {}}));
    }

    #[test]
    fn depth_follows_longest_branch() {
        assert_eq!(Action::read(1).depth(), 1);
        let nested = Action::matching(
            Criteria::new(),
            Some(Action::matching(Criteria::new(), None, Some(Action::noop()))),
            None,
        );
        assert_eq!(nested.depth(), 3);
    }

    #[test]
    fn kind_matches_serialized_tag() {
        for action in [
            Action::read(1),
            Action::matching(Criteria::new(), None, None),
            Action::log("id"),
            Action::noop(),
        ] {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.kind());
            assert!(Action::KINDS.contains(&action.kind()));
        }
    }
}
