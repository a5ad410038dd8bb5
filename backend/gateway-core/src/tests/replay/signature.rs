// Unit tests for reasoning signature parsing
// Both wire shapes (object and JSON string) must agree

use crate::replay::ReasoningSignature;

use serde_json::{Value, json};

fn parsed(raw: Value) -> Option<ReasoningSignature> {
    ReasoningSignature::parse(&raw)
}

/// **VALUE**: Verifies both signature encodings parse to the same signature.
///
/// **WHY THIS MATTERS**: The provider has emitted the signature as an object and as a JSON
/// string. Replay must treat them identically or half the sessions keep orphaned blocks.
///
/// **BUG THIS CATCHES**: Would catch if one of the two branches of `parse` drifts.
#[test]
fn given_object_and_string_encodings_when_parsed_then_yield_same_signature() {
    // GIVEN: The same signature in both encodings
    let object = json!({"id": "rs_123", "type": "reasoning"});
    let string = json!("  {\"id\":\"rs_123\",\"type\":\"reasoning\"}  ");

    // WHEN: Parsing both
    let from_object = parsed(object);
    let from_string = parsed(string);

    // THEN: Both are valid and equal
    let expected = ReasoningSignature {
        id: String::from("rs_123"),
        kind: String::from("reasoning"),
    };
    assert_eq!(from_object, Some(expected.clone()));
    assert_eq!(from_string, Some(expected));
}

/// **VALUE**: Verifies the accepted id prefixes and reasoning kinds.
///
/// **WHY THIS MATTERS**: Only provider-issued reasoning items are subject to the replay rule.
/// Everything else must be left alone.
///
/// **BUG THIS CATCHES**: Would catch a dropped `s_` prefix or a `reasoning.` subtype check
/// that degrades to a plain `starts_with("reasoning")`.
#[test]
fn given_prefixes_and_kinds_when_parsed_then_only_reasoning_items_validate() {
    assert!(parsed(json!({"id": "s_1", "type": "reasoning.summary"})).is_some());
    assert!(parsed(json!({"id": "rs_1", "type": "reasoning.encrypted"})).is_some());
    assert!(parsed(json!({"id": "msg_1", "type": "reasoning"})).is_none());
    assert!(parsed(json!({"id": "rs_1", "type": "reasoningish"})).is_none());
    assert!(parsed(json!({"id": "rs_1", "type": "message"})).is_none());
}

/// **VALUE**: Verifies malformed signatures yield `None` rather than an error.
///
/// **WHY THIS MATTERS**: Replay sits on the critical path of every turn. A malformed signature
/// must degrade to "leave the block alone", never fail the request.
///
/// **BUG THIS CATCHES**: Would catch a panic on bad JSON or non-string fields read as valid.
#[test]
fn given_malformed_signatures_when_parsed_then_returns_none() {
    assert!(parsed(json!("not json")).is_none());
    assert!(parsed(json!("")).is_none());
    assert!(parsed(json!("{not: json}")).is_none());
    assert!(parsed(json!("[{\"id\":\"rs_1\",\"type\":\"reasoning\"}]")).is_none());
    assert!(parsed(json!({"id": 123, "type": "reasoning"})).is_none());
    assert!(parsed(json!({"type": "reasoning"})).is_none());
    assert!(parsed(json!({"id": "rs_1"})).is_none());
    assert!(parsed(json!(["rs_1", "reasoning"])).is_none());
    assert!(parsed(json!(42)).is_none());
    assert!(parsed(Value::Null).is_none());
}
