use anyhow::Context;
use serde_json::Value as Json;
use std::path::Path;

use super::runtime::DEFAULT_MAX_DEPTH;
use super::{Action, ProgramError, Result};

/// Parse a JSON program (an array of actions) into typed actions.
pub fn parse_program(source: &str) -> Result<Vec<Action>> {
    let json: Json = serde_json::from_str(source)?;
    let items = json
        .as_array()
        .ok_or_else(|| ProgramError::Invalid("program must be a JSON array of actions".into()))?;
    items.iter().map(decode_action).collect()
}

/// Read and parse a program file.
pub fn load_program(path: &Path) -> anyhow::Result<Vec<Action>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read program: {:?}", path))?;
    parse_program(&source).with_context(|| format!("Failed to parse program: {:?}", path))
}

/// Decode a single JSON action nested at most [`DEFAULT_MAX_DEPTH`] levels.
pub fn decode_action(json: &Json) -> Result<Action> {
    decode_action_within(json, DEFAULT_MAX_DEPTH)
}

/// Decode a single JSON action, checking every tag in the tree first.
///
/// Trees nesting deeper than `max_depth` actions are rejected before decoding.
pub fn decode_action_within(json: &Json, max_depth: usize) -> Result<Action> {
    check_tags(json, 1, max_depth)?;
    Ok(serde_json::from_value(json.clone())?)
}

fn check_tags(json: &Json, depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(ProgramError::Invalid(format!(
            "action nesting exceeds {} levels",
            max_depth
        )));
    }
    let object = json
        .as_object()
        .ok_or_else(|| ProgramError::Invalid(format!("action must be an object, got {}", json)))?;
    let tag = match object.get("type") {
        Some(Json::String(tag)) => tag,
        Some(other) => {
            return Err(ProgramError::Invalid(format!(
                "action type must be a string, got {}",
                other
            )));
        }
        None => return Err(ProgramError::MissingType),
    };
    if !Action::KINDS.contains(&tag.as_str()) {
        return Err(ProgramError::UnknownActionType(tag.clone()));
    }
    if tag == "match" {
        for slot in ["onSuccess", "onFail"] {
            match object.get(slot) {
                None | Some(Json::Null) => {}
                Some(child) => check_tags(child, depth + 1, max_depth)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Criteria, Value};

    #[test]
    fn parses_canonical_program() {
        let actions = parse_program(
            r#"[
                {"type": "read", "params": {"id": 15}},
                {"type": "match", "criteria": {"name": "marcus"},
                 "onSuccess": {"type": "log", "key": "age"},
                 "onFail": {"type": "noop"}}
            ]"#,
        )
        .unwrap();

        let mut criteria = Criteria::new();
        criteria.insert("name".into(), Value::from("marcus"));
        assert_eq!(
            actions,
            vec![
                Action::read(15),
                Action::matching(criteria, Some(Action::log("age")), Some(Action::noop())),
            ]
        );
    }

    #[test]
    fn null_continuation_means_absent() {
        let actions =
            parse_program(r#"[{"type": "match", "criteria": {}, "onSuccess": null}]"#).unwrap();
        assert_eq!(actions, vec![Action::matching(Criteria::new(), None, None)]);
    }

    #[test]
    fn unknown_top_level_tag_is_reported() {
        let err = parse_program(r#"[{"type": "write", "key": "x"}]"#).unwrap_err();
        assert!(matches!(err, ProgramError::UnknownActionType(tag) if tag == "write"));
    }

    #[test]
    fn unknown_nested_tag_is_reported() {
        let err = parse_program(
            r#"[{"type": "match", "criteria": {}, "onFail": {"type": "delete"}}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProgramError::UnknownActionType(tag) if tag == "delete"));
    }

    fn nested_matches(levels: usize) -> Json {
        let mut json = serde_json::json!({"type": "log", "key": "age"});
        for _ in 0..levels {
            json = serde_json::json!({"type": "match", "criteria": {}, "onSuccess": json});
        }
        json
    }

    #[test]
    fn deep_hand_built_trees_are_rejected_before_decoding() {
        let err = decode_action(&nested_matches(1_000)).unwrap_err();
        assert!(matches!(err, ProgramError::Invalid(ref msg) if msg.contains("128")));
    }

    #[test]
    fn depth_limit_counts_the_top_level_action() {
        assert!(decode_action_within(&nested_matches(2), 3).is_ok());
        assert!(matches!(
            decode_action_within(&nested_matches(3), 3),
            Err(ProgramError::Invalid(_))
        ));
    }

    #[test]
    fn missing_tag_and_bad_shapes() {
        assert!(matches!(
            parse_program(r#"[{"key": "age"}]"#),
            Err(ProgramError::MissingType)
        ));
        assert!(matches!(
            parse_program(r#"{"type": "noop"}"#),
            Err(ProgramError::Invalid(_))
        ));
        assert!(matches!(
            parse_program(r#"[{"type": "read"}]"#),
            Err(ProgramError::Json(_))
        ));
        assert!(matches!(parse_program("[oops"), Err(ProgramError::Json(_))));
    }
}
