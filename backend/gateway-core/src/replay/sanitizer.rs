use crate::replay::signature::ReasoningSignature;

use models::{ContentBlock, Message};

use std::borrow::Cow;

use log::debug;

/// What a sanitizing pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Orphaned signed reasoning blocks dropped.
    pub blocks_dropped: usize,
    /// Assistant messages elided because nothing was left in them.
    pub messages_dropped: usize,
}

/// Drop orphaned signed reasoning blocks from a conversation history.
///
/// Unchanged messages come back as [`Cow::Borrowed`] pointing at the input,
/// so callers comparing by reference see no churn. Rewritten messages are
/// [`Cow::Owned`]. Assistant messages left with no content are removed.
pub fn downgrade_reasoning_blocks(messages: &[Message]) -> Vec<Cow<'_, Message>> {
    downgrade_reasoning_blocks_with_stats(messages).0
}

/// [`downgrade_reasoning_blocks`] plus a count of what was removed.
pub fn downgrade_reasoning_blocks_with_stats(
    messages: &[Message],
) -> (Vec<Cow<'_, Message>>, ReplayStats) {
    let mut stats = ReplayStats::default();
    let mut out = Vec::with_capacity(messages.len());

    for message in messages {
        let Some(keep) = replay_mask(message) else {
            out.push(Cow::Borrowed(message));
            continue;
        };

        let blocks: Vec<ContentBlock> = message
            .blocks()
            .unwrap_or_default()
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| **kept)
            .map(|(block, _)| block.clone())
            .collect();

        stats.blocks_dropped += keep.len() - blocks.len();
        if blocks.is_empty() {
            stats.messages_dropped += 1;
            continue;
        }

        out.push(Cow::Owned(message.with_blocks(blocks)));
    }

    log_stats(&stats);
    (out, stats)
}

/// Owning variant: unchanged messages are moved through without cloning.
pub fn downgrade_reasoning_blocks_owned(messages: Vec<Message>) -> Vec<Message> {
    let mut stats = ReplayStats::default();
    let mut out = Vec::with_capacity(messages.len());

    for mut message in messages {
        let Some(keep) = replay_mask(&message) else {
            out.push(message);
            continue;
        };

        if let Some(blocks) = message.blocks_mut() {
            let mut flags = keep.iter();
            blocks.retain(|_| flags.next().copied().unwrap_or(true));
            stats.blocks_dropped += keep.len() - blocks.len();

            if blocks.is_empty() {
                stats.messages_dropped += 1;
                continue;
            }
        }

        out.push(message);
    }

    log_stats(&stats);
    out
}

/// `true` if any block after `index` is not a thinking block.
///
/// Out-of-range indices have nothing after them and yield `false`.
pub fn has_following_non_thinking_block(blocks: &[ContentBlock], index: usize) -> bool {
    blocks
        .iter()
        .skip(index.saturating_add(1))
        .any(|block| !block.is_thinking())
}

/// Per-block keep flags for an assistant message, or `None` when nothing
/// would be dropped (including every non-assistant or non-array message).
fn replay_mask(message: &Message) -> Option<Vec<bool>> {
    if !message.is_assistant() {
        return None;
    }

    let blocks = message.blocks()?;
    let keep: Vec<bool> = (0..blocks.len())
        .map(|index| !is_orphaned_reasoning(blocks, index))
        .collect();

    keep.contains(&false).then_some(keep)
}

fn is_orphaned_reasoning(blocks: &[ContentBlock], index: usize) -> bool {
    let Some(ContentBlock::Thinking(thinking)) = blocks.get(index) else {
        return false;
    };

    let Some(signature) = thinking.signature().and_then(ReasoningSignature::parse) else {
        return false;
    };

    if has_following_non_thinking_block(blocks, index) {
        return false;
    }

    debug!("Dropping orphaned reasoning block {}", signature.id);
    true
}

fn log_stats(stats: &ReplayStats) {
    if *stats != ReplayStats::default() {
        debug!(
            "Replay sanitized: {} reasoning blocks dropped, {} messages elided",
            stats.blocks_dropped, stats.messages_dropped
        );
    }
}
