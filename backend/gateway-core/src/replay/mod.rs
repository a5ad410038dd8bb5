//! Replay sanitizing for provider-bound conversation history.
//!
//! The provider's responses API hands back reasoning items with an opaque
//! signature. On replay it accepts a signed reasoning item only if some other
//! content follows it in the same assistant turn; an orphaned one (typically
//! the tail of an interrupted turn) fails the whole request.
//!
//! [`downgrade_reasoning_blocks`] drops exactly those orphaned blocks and
//! leaves everything else alone. It is total: malformed input is passed
//! through, never rejected.

mod sanitizer;
pub mod signature;

pub use sanitizer::{
    ReplayStats, downgrade_reasoning_blocks, downgrade_reasoning_blocks_owned,
    downgrade_reasoning_blocks_with_stats, has_following_non_thinking_block,
};
pub use signature::ReasoningSignature;
