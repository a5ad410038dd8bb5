// Unit tests for the lookahead helper
// Whole-history behaviour is covered in integration_tests/replay/sanitizer.rs

use crate::replay::has_following_non_thinking_block;

use models::{ContentBlock, ThinkingBlock};

use serde_json::json;

fn thinking() -> ContentBlock {
    ThinkingBlock::new("step").into()
}

fn text() -> ContentBlock {
    ContentBlock::text("answer")
}

/// **VALUE**: Verifies the lookahead finds content anywhere after the index.
///
/// **WHY THIS MATTERS**: A signed reasoning block followed by more reasoning and then text is
/// still paired with content and must be kept.
///
/// **BUG THIS CATCHES**: Would catch a lookahead that only inspects the next block.
#[test]
fn given_thinking_then_text_later_when_looking_ahead_then_returns_true() {
    // GIVEN: thinking, thinking, text
    let blocks = vec![thinking(), thinking(), text()];

    // THEN: Both thinking blocks have following content, the last block does not
    assert!(has_following_non_thinking_block(&blocks, 0));
    assert!(has_following_non_thinking_block(&blocks, 1));
    assert!(!has_following_non_thinking_block(&blocks, 2));
}

/// **VALUE**: Verifies trailing reasoning has no following content.
///
/// **WHY THIS MATTERS**: This is the orphaned case the provider rejects.
///
/// **BUG THIS CATCHES**: Would catch if thinking blocks were counted as content.
#[test]
fn given_only_trailing_thinking_when_looking_ahead_then_returns_false() {
    // GIVEN: text, thinking, thinking
    let blocks = vec![text(), thinking(), thinking()];

    // THEN: Neither thinking block is followed by content
    assert!(!has_following_non_thinking_block(&blocks, 1));
    assert!(!has_following_non_thinking_block(&blocks, 2));
}

/// **VALUE**: Verifies malformed blocks count as content.
///
/// **WHY THIS MATTERS**: A non-object entry is not reasoning, so the block before it is not
/// orphaned.
///
/// **BUG THIS CATCHES**: Would catch if opaque blocks were skipped by the lookahead.
#[test]
fn given_non_object_block_after_thinking_when_looking_ahead_then_returns_true() {
    // GIVEN: thinking followed by a bare string and null
    let blocks = vec![
        thinking(),
        ContentBlock::from(json!("stray")),
        ContentBlock::from(json!(null)),
    ];

    // THEN: The thinking block has following content
    assert!(has_following_non_thinking_block(&blocks, 0));
}

/// **VALUE**: Verifies out-of-range indices are safe.
///
/// **WHY THIS MATTERS**: The helper is public; an index past the end must not panic.
///
/// **BUG THIS CATCHES**: Would catch an overflow on `index + 1` for `usize::MAX`.
#[test]
fn given_index_past_end_when_looking_ahead_then_returns_false() {
    let blocks = vec![text()];

    assert!(!has_following_non_thinking_block(&blocks, 5));
    assert!(!has_following_non_thinking_block(&blocks, usize::MAX));
    assert!(!has_following_non_thinking_block(&[], 0));
}
