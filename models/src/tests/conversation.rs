// Unit tests for the conversation data model
// Focus: raw JSON is preserved and only `thinking` blocks are distinguished

use crate::{ContentBlock, Message, MessageContent, Role, ThinkingBlock};

use serde_json::{Value, json};

/// **VALUE**: Verifies that a stored assistant turn deserializes into typed thinking blocks.
///
/// **WHY THIS MATTERS**: Replay sanitizing only works if `{"type": "thinking"}` blocks are
/// recognised as such when history is loaded.
///
/// **BUG THIS CATCHES**: Would catch if the `type` tag check or the signature key
/// (`thinkingSignature`) drifts from the stored format.
#[test]
fn given_assistant_json_when_deserialized_then_thinking_blocks_are_typed() {
    // GIVEN: An assistant message with a thinking block and a text block
    let raw = json!({
        "role": "assistant",
        "content": [
            {"type": "thinking", "thinking": "hmm", "thinkingSignature": "{\"id\":\"rs_1\"}"},
            {"type": "text", "text": "hello"}
        ]
    });

    // WHEN: Deserializing
    let message: Message = serde_json::from_value(raw).expect("valid message");

    // THEN: First block is a thinking block with its raw signature, second is opaque
    assert_eq!(message.role, Some(Role::Assistant));
    let blocks = message.blocks().expect("content is an array");
    let thinking = blocks[0].as_thinking().expect("first block is thinking");
    assert_eq!(thinking.thinking(), Some("hmm"));
    assert_eq!(thinking.signature(), Some(&json!("{\"id\":\"rs_1\"}")));
    assert_eq!(blocks[1].block_type(), Some("text"));
    assert!(!blocks[1].is_thinking());
}

/// **VALUE**: Verifies that a load/save cycle writes back exactly what was read.
///
/// **WHY THIS MATTERS**: The provider rejects replayed reasoning whose signature payload was
/// altered. Extra top-level fields and unknown blocks must also survive.
///
/// **BUG THIS CATCHES**: Would catch if the `type` tag is not reinserted on serialize, or if
/// `extra` stops being flattened.
#[test]
fn given_message_with_unknown_fields_when_round_tripped_then_json_is_unchanged() {
    // GIVEN: A message with structured signature, extra fields and a non-object block
    let raw = json!({
        "role": "assistant",
        "timestamp": 1_700_000_000,
        "provider": "openai",
        "content": [
            {"type": "thinking", "thinking": 42, "thinkingSignature": {"id": "s_9", "type": "reasoning.summary"}},
            "stray",
            {"type": "toolCall", "id": "call_1", "arguments": {}}
        ]
    });

    // WHEN: Deserializing then serializing
    let message: Message = serde_json::from_value(raw.clone()).expect("valid message");
    let written = serde_json::to_value(&message).expect("serializable");

    // THEN: JSON should be identical
    assert_eq!(written, raw);
    assert!(message.blocks().expect("array")[0].is_thinking());
}

/// **VALUE**: Verifies that non-array content is carried opaquely.
///
/// **WHY THIS MATTERS**: Providers and older sessions store plain-string content. Those
/// messages must load and pass through untouched rather than fail deserialization.
///
/// **BUG THIS CATCHES**: Would catch if content were typed as `Vec<ContentBlock>` only.
#[test]
fn given_string_content_when_deserialized_then_content_is_opaque() {
    // GIVEN: A message whose content is a string
    let raw = json!({"role": "user", "content": "plain text"});

    // WHEN: Deserializing
    let message: Message = serde_json::from_value(raw).expect("valid message");

    // THEN: Content is opaque and there are no blocks
    assert_eq!(message.content, Some(MessageContent::Opaque(json!("plain text"))));
    assert!(message.blocks().is_none());
}

/// **VALUE**: Verifies that unknown roles are kept verbatim.
///
/// **WHY THIS MATTERS**: Non-assistant messages pass through replay unchanged, whatever role
/// name the collaborator used.
///
/// **BUG THIS CATCHES**: Would catch if unknown roles were rejected or normalised.
#[test]
fn given_unknown_role_when_round_tripped_then_role_is_preserved() {
    // GIVEN: A message with a custom role
    let raw = json!({"role": "developer", "content": []});

    // WHEN: Deserializing then serializing
    let message: Message = serde_json::from_value(raw.clone()).expect("valid message");

    // THEN: Role is Other and written back unchanged
    assert_eq!(message.role, Some(Role::Other(String::from("developer"))));
    assert_eq!(serde_json::to_value(&message).expect("serializable"), raw);
}

/// **VALUE**: Verifies that a `null` signature counts as absent.
///
/// **WHY THIS MATTERS**: Sessions written by older clients store `"thinkingSignature": null`.
/// Treating that as a signature value would route it through parsing needlessly.
///
/// **BUG THIS CATCHES**: Would catch if `signature()` returned `Some(Value::Null)`.
#[test]
fn given_null_signature_when_reading_signature_then_returns_none() {
    // GIVEN: A thinking block with an explicit null signature
    let block = ThinkingBlock::new("reasoning").with_signature(Value::Null);

    // THEN: Signature is absent
    assert!(block.signature().is_none());
    assert!(ContentBlock::from(block).is_thinking());
}

/// **VALUE**: Verifies that entries without a string role still load and write back as-is.
///
/// **WHY THIS MATTERS**: One malformed entry must not make a whole stored conversation
/// unloadable. Replay passes such entries through untouched.
///
/// **BUG THIS CATCHES**: Would catch `role` becoming a required string field again.
#[test]
fn given_missing_or_non_string_role_when_round_tripped_then_json_is_unchanged() {
    // GIVEN: Entries with no role, a null role and an object role
    let entries = [
        json!({"content": [{"type": "text", "text": "x"}]}),
        json!({"role": null, "content": "x"}),
        json!({"role": {"name": "assistant"}, "content": []}),
    ];

    for raw in entries {
        // WHEN: Deserializing then serializing
        let message: Message = serde_json::from_value(raw.clone()).expect("should load");
        let written = serde_json::to_value(&message).expect("serializable");

        // THEN: Not an assistant message, and JSON is identical
        assert!(!message.is_assistant());
        assert_eq!(written, raw);
    }
}

/// **VALUE**: Verifies that an explicit `null` content is kept, and a missing one stays missing.
///
/// **WHY THIS MATTERS**: A load/save cycle must not change the stored shape of a message.
///
/// **BUG THIS CATCHES**: Would catch `null` and "absent" being collapsed into one state.
#[test]
fn given_null_or_missing_content_when_round_tripped_then_shape_is_kept() {
    // GIVEN: One message with null content and one with none
    let null_content = json!({"role": "assistant", "content": null});
    let no_content = json!({"role": "assistant", "stopReason": "error"});

    // WHEN: Deserializing
    let with_null: Message = serde_json::from_value(null_content.clone()).expect("should load");
    let without: Message = serde_json::from_value(no_content.clone()).expect("should load");

    // THEN: The two are distinguished and both round-trip
    assert_eq!(with_null.content, Some(MessageContent::Opaque(Value::Null)));
    assert_eq!(without.content, None);
    assert_eq!(serde_json::to_value(&with_null).expect("serializable"), null_content);
    assert_eq!(serde_json::to_value(&without).expect("serializable"), no_content);
}
