//! Conversation history as replayed to a model provider.
//!
//! Only the parts of the message shape that replay sanitizing cares about are
//! typed: the role, and whether a content block is a `thinking` block. Every
//! other field and block is carried as raw JSON so a load/save cycle through
//! these types never loses provider-specific data.

mod content;
mod message;
mod role;

pub use content::{ContentBlock, THINKING_BLOCK_TYPE, ThinkingBlock};
pub use message::{Message, MessageContent};
pub use role::Role;
