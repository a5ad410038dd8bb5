use gateway_core::replay::{
    ReplayStats, downgrade_reasoning_blocks, downgrade_reasoning_blocks_owned,
    downgrade_reasoning_blocks_with_stats,
};
use models::{ContentBlock, Message, MessageContent, Role, ThinkingBlock};

use std::borrow::Cow;

use serde_json::{Value, json};

// ============================================================================
// Public API tests for replay sanitizing
// ============================================================================

fn signed_thinking(signature: Value) -> ContentBlock {
    ThinkingBlock::new("internal reasoning")
        .with_signature(signature)
        .into()
}

fn valid_signature() -> Value {
    json!({"id": "rs_123", "type": "reasoning"})
}

fn owned(messages: Vec<Cow<'_, Message>>) -> Vec<Message> {
    messages.into_iter().map(Cow::into_owned).collect()
}

/// **VALUE**: Verifies signed reasoning followed by text is replayed verbatim.
///
/// **WHY THIS MATTERS**: The provider requires the signature on reasoning that precedes content.
/// Dropping or rewriting it breaks reasoning continuity across turns.
///
/// **BUG THIS CATCHES**: Would catch an over-eager filter that drops every signed block.
#[test]
fn given_signed_thinking_followed_by_text_when_sanitized_then_message_is_untouched() {
    // GIVEN: Signed reasoning then text
    let messages = vec![Message::assistant(vec![
        signed_thinking(valid_signature()),
        ContentBlock::text("answer"),
    ])];

    // WHEN: Sanitizing
    let out = downgrade_reasoning_blocks(&messages);

    // THEN: Same message, borrowed from the input
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0], Cow::Borrowed(_)), "Unchanged message must not be copied");
    assert!(std::ptr::eq(out[0].as_ref(), &messages[0]));
}

/// **VALUE**: Verifies trailing signed reasoning is dropped, keeping the rest of the turn.
///
/// **WHY THIS MATTERS**: This is the orphaned block the provider rejects with a 400.
///
/// **BUG THIS CATCHES**: Would catch a filter that drops the whole message or keeps the block.
#[test]
fn given_trailing_signed_thinking_when_sanitized_then_only_that_block_is_removed() {
    // GIVEN: text then signed reasoning, with extra metadata on the message
    let mut message = Message::assistant(vec![
        ContentBlock::text("answer"),
        signed_thinking(valid_signature()),
    ]);
    message.extra.insert(String::from("stopReason"), json!("aborted"));
    let messages = vec![message];

    // WHEN: Sanitizing
    let (out, stats) = downgrade_reasoning_blocks_with_stats(&messages);

    // THEN: New message with only the text block; metadata kept
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0], Cow::Owned(_)));
    assert_eq!(out[0].blocks(), Some(&[ContentBlock::text("answer")][..]));
    assert_eq!(out[0].extra.get("stopReason"), Some(&json!("aborted")));
    assert_eq!(
        stats,
        ReplayStats {
            blocks_dropped: 1,
            messages_dropped: 0
        }
    );
}

/// **VALUE**: Verifies an assistant turn holding only orphaned reasoning disappears.
///
/// **WHY THIS MATTERS**: An assistant message with no content is itself invalid for the
/// provider, so it is elided rather than sent empty.
///
/// **BUG THIS CATCHES**: Would catch an empty `content: []` message being emitted.
#[test]
fn given_only_signed_thinking_when_sanitized_then_message_is_removed() {
    // GIVEN: user, orphaned-only assistant, user
    let messages = vec![
        Message::user("first"),
        Message::assistant(vec![
            signed_thinking(valid_signature()),
            signed_thinking(json!("{\"id\":\"s_9\",\"type\":\"reasoning.summary\"}")),
        ]),
        Message::user("second"),
    ];

    // WHEN: Sanitizing
    let (out, stats) = downgrade_reasoning_blocks_with_stats(&messages);

    // THEN: The assistant message is gone; order of the rest is kept
    assert_eq!(out.len(), 2);
    assert!(std::ptr::eq(out[0].as_ref(), &messages[0]));
    assert!(std::ptr::eq(out[1].as_ref(), &messages[2]));
    assert_eq!(stats.blocks_dropped, 2);
    assert_eq!(stats.messages_dropped, 1);
}

/// **VALUE**: Verifies invalid or missing signatures are never subject to the rule.
///
/// **WHY THIS MATTERS**: Reasoning from other providers (or unsigned local reasoning) is not
/// rejected on replay and must not be thrown away.
///
/// **BUG THIS CATCHES**: Would catch a filter keyed on block type alone.
#[test]
fn given_unsigned_or_invalid_trailing_thinking_when_sanitized_then_kept() {
    // GIVEN: Trailing thinking blocks with no, unparseable and non-reasoning signatures
    let messages = vec![
        Message::assistant(vec![ContentBlock::from(ThinkingBlock::new("plain"))]),
        Message::assistant(vec![signed_thinking(json!("not json"))]),
        Message::assistant(vec![
            ContentBlock::text("hi"),
            signed_thinking(json!({"id": "msg_1", "type": "reasoning"})),
        ]),
    ];

    // WHEN: Sanitizing
    let out = downgrade_reasoning_blocks(&messages);

    // THEN: Everything comes back borrowed
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|m| matches!(m, Cow::Borrowed(_))));
}

/// **VALUE**: Verifies the exact signature payload survives on kept blocks.
///
/// **WHY THIS MATTERS**: The provider validates the signature bytes. Re-serializing a parsed
/// form (key order, whitespace) would invalidate it.
///
/// **BUG THIS CATCHES**: Would catch a sanitizer that writes back the parsed signature.
#[test]
fn given_string_signature_with_odd_spacing_when_kept_then_payload_is_verbatim() {
    // GIVEN: A kept block whose signature string has unusual spacing, in a rewritten message
    let raw = " { \"type\" : \"reasoning\", \"id\" : \"rs_7\" } ";
    let messages = vec![Message::assistant(vec![
        signed_thinking(json!(raw)),
        ContentBlock::text("answer"),
        signed_thinking(valid_signature()),
    ])];

    // WHEN: Sanitizing
    let out = owned(downgrade_reasoning_blocks(&messages));

    // THEN: The kept block's signature is byte-identical
    let blocks = out[0].blocks().expect("array content");
    assert_eq!(blocks.len(), 2);
    let kept = blocks[0].as_thinking().expect("first block is thinking");
    assert_eq!(kept.signature(), Some(&json!(raw)));
}

/// **VALUE**: Verifies reasoning chained before content is kept while trailing reasoning goes.
///
/// **WHY THIS MATTERS**: Multi-step reasoning interleaved with tool calls is normal. Only the
/// blocks after the last non-thinking block are orphaned.
///
/// **BUG THIS CATCHES**: Would catch lookahead that only considers the immediate neighbour.
#[test]
fn given_interleaved_reasoning_when_sanitized_then_only_tail_reasoning_is_dropped() {
    // GIVEN: R1 R2 tool R3 text R4 R5
    let tool_call = ContentBlock::from(json!({"type": "toolCall", "id": "call_1"}));
    let messages = vec![Message::assistant(vec![
        signed_thinking(json!({"id": "rs_1", "type": "reasoning"})),
        signed_thinking(json!({"id": "rs_2", "type": "reasoning"})),
        tool_call.clone(),
        signed_thinking(json!({"id": "rs_3", "type": "reasoning"})),
        ContentBlock::text("answer"),
        signed_thinking(json!({"id": "rs_4", "type": "reasoning"})),
        signed_thinking(json!({"id": "rs_5", "type": "reasoning"})),
    ])];

    // WHEN: Sanitizing
    let out = owned(downgrade_reasoning_blocks(&messages));

    // THEN: R1 R2 tool R3 text remain in order
    let ids: Vec<Option<String>> = out[0]
        .blocks()
        .expect("array content")
        .iter()
        .map(|b| {
            b.as_thinking()
                .and_then(|t| t.signature())
                .and_then(|s| s.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            Some(String::from("rs_1")),
            Some(String::from("rs_2")),
            None,
            Some(String::from("rs_3")),
            None,
        ]
    );
    assert_eq!(out[0].blocks().expect("array")[2], tool_call);
}

/// **VALUE**: Verifies non-assistant messages are untouched for every content shape.
///
/// **WHY THIS MATTERS**: The provider rule only concerns assistant turns; user and tool
/// messages may legitimately carry anything.
///
/// **BUG THIS CATCHES**: Would catch a role check that was inverted or removed.
#[test]
fn given_non_assistant_messages_when_sanitized_then_all_returned_unchanged() {
    // GIVEN: Non-assistant messages with orphaned reasoning and malformed content
    let trailing = vec![ContentBlock::text("x"), signed_thinking(valid_signature())];
    let messages = vec![
        Message::new(Role::User, MessageContent::Blocks(trailing.clone())),
        Message::new(Role::ToolResult, MessageContent::Blocks(vec![signed_thinking(valid_signature())])),
        Message::new(Role::System, MessageContent::Opaque(json!("be brief"))),
        Message::new(Role::Other(String::from("developer")), MessageContent::Opaque(Value::Null)),
        Message::new(Role::Tool, MessageContent::Opaque(json!({"not": "an array"}))),
    ];

    // WHEN: Sanitizing
    let out = downgrade_reasoning_blocks(&messages);

    // THEN: Every message is the input message
    assert_eq!(out.len(), messages.len());
    for (kept, original) in out.iter().zip(&messages) {
        assert!(std::ptr::eq(kept.as_ref(), original));
    }
}

/// **VALUE**: Verifies assistant messages with non-array content pass through.
///
/// **WHY THIS MATTERS**: Older sessions stored assistant text as a bare string.
///
/// **BUG THIS CATCHES**: Would catch a sanitizer that drops or rejects such messages.
#[test]
fn given_assistant_with_string_content_when_sanitized_then_passes_through() {
    let messages = vec![Message::new(Role::Assistant, MessageContent::Opaque(json!("hello")))];

    let out = downgrade_reasoning_blocks(&messages);

    assert_eq!(out.len(), 1);
    assert!(matches!(out[0], Cow::Borrowed(_)));
}

/// **VALUE**: Verifies a second pass changes nothing.
///
/// **WHY THIS MATTERS**: History is sanitized before every request, including histories that
/// were already sanitized and stored.
///
/// **BUG THIS CATCHES**: Would catch a rewrite that exposes new orphans (e.g. dropping content
/// instead of reasoning).
#[test]
fn given_sanitized_history_when_sanitized_again_then_result_is_identical() {
    // GIVEN: A mixed history
    let messages = vec![
        Message::user("q"),
        Message::assistant(vec![
            signed_thinking(valid_signature()),
            ContentBlock::text("a"),
            signed_thinking(valid_signature()),
        ]),
        Message::assistant(vec![signed_thinking(valid_signature())]),
        Message::assistant(vec![signed_thinking(json!("not json"))]),
    ];

    // WHEN: Sanitizing twice
    let once = owned(downgrade_reasoning_blocks(&messages));
    let (twice, stats) = downgrade_reasoning_blocks_with_stats(&once);

    // THEN: Second pass is a no-op
    assert_eq!(owned(twice), once);
    assert_eq!(stats, ReplayStats::default());
}

/// **VALUE**: Verifies the owning variant matches the borrowing one.
///
/// **WHY THIS MATTERS**: Request builders that own their history use the owned variant to
/// avoid clones; both must implement the same rule.
///
/// **BUG THIS CATCHES**: Would catch the keep-mask being applied misaligned in `retain`.
#[test]
fn given_history_when_sanitized_owned_then_matches_borrowed_result() {
    // GIVEN: A history exercising drop, keep and elide
    let messages = vec![
        Message::assistant(vec![
            ContentBlock::text("a"),
            signed_thinking(valid_signature()),
        ]),
        Message::assistant(vec![signed_thinking(valid_signature())]),
        Message::assistant(vec![
            signed_thinking(valid_signature()),
            ContentBlock::text("b"),
        ]),
        Message::user("c"),
    ];

    // WHEN: Sanitizing both ways
    let borrowed = owned(downgrade_reasoning_blocks(&messages));
    let moved = downgrade_reasoning_blocks_owned(messages);

    // THEN: Same result
    assert_eq!(moved, borrowed);
    assert_eq!(moved.len(), 3);
}

/// **VALUE**: Verifies sanitizing works on history loaded straight from JSON.
///
/// **WHY THIS MATTERS**: History comes from the session store as JSON; the typed model and the
/// sanitizer must agree on field names.
///
/// **BUG THIS CATCHES**: Would catch a renamed signature key that makes every block look
/// unsigned.
#[test]
fn given_json_history_when_sanitized_then_orphan_removed_from_output_json() {
    // GIVEN: A stored history
    let stored = json!([
        {"role": "user", "content": "hi"},
        {"role": "assistant", "api": "openai-responses", "content": [
            {"type": "text", "text": "hello"},
            {"type": "thinking", "thinking": "", "thinkingSignature": "{\"id\":\"rs_abc\",\"type\":\"reasoning\"}"}
        ]}
    ]);
    let messages: Vec<Message> = serde_json::from_value(stored).expect("valid history");

    // WHEN: Sanitizing and writing back
    let out = owned(downgrade_reasoning_blocks(&messages));
    let written = serde_json::to_value(&out).expect("serializable");

    // THEN: Only the orphaned block is gone
    assert_eq!(
        written,
        json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "api": "openai-responses", "content": [
                {"type": "text", "text": "hello"}
            ]}
        ])
    );
}

/// **VALUE**: Verifies entries with a missing or non-string role load and pass through.
///
/// **WHY THIS MATTERS**: Only assistant turns are rewritten. A malformed entry elsewhere in
/// the history must neither block loading nor be altered.
///
/// **BUG THIS CATCHES**: Would catch a sanitizer that treats a role-less entry as assistant,
/// or a model that refuses to load it.
#[test]
fn given_entries_without_string_role_when_sanitized_then_passed_through() {
    // GIVEN: Role-less and odd-role entries that end with signed reasoning
    let stored = json!([
        {"content": [
            {"type": "text", "text": "x"},
            {"type": "thinking", "thinking": "", "thinkingSignature": {"id": "rs_1", "type": "reasoning"}}
        ]},
        {"role": 7, "content": [
            {"type": "thinking", "thinking": "", "thinkingSignature": {"id": "rs_2", "type": "reasoning"}}
        ]}
    ]);
    let messages: Vec<Message> = serde_json::from_value(stored.clone()).expect("should load");

    // WHEN: Sanitizing
    let (out, stats) = downgrade_reasoning_blocks_with_stats(&messages);

    // THEN: Both borrowed, nothing dropped, JSON unchanged
    assert!(out.iter().all(|m| matches!(m, Cow::Borrowed(_))));
    assert_eq!(stats, ReplayStats::default());
    assert_eq!(serde_json::to_value(owned(out)).expect("serializable"), stored);
}
