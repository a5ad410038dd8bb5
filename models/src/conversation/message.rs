use crate::conversation::{ContentBlock, Role};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One turn of a stored conversation.
///
/// Unknown top-level fields (timestamps, usage, provider metadata) are kept in
/// `extra` and written back unchanged. `role` and `content` are `None` only
/// when the key is missing; an explicit `null` is kept as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marks a key that was present in the input, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Message {
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role: Some(role),
            content: Some(content),
            extra: Map::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Blocks(vec![ContentBlock::text(text)]))
    }

    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, MessageContent::Blocks(blocks))
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Some(Role::Assistant)
    }

    /// Content blocks, when content is a well-formed array.
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => Some(blocks),
            Some(MessageContent::Opaque(_)) | None => None,
        }
    }

    /// Mutable content blocks, when content is a well-formed array.
    pub fn blocks_mut(&mut self) -> Option<&mut Vec<ContentBlock>> {
        match &mut self.content {
            Some(MessageContent::Blocks(blocks)) => Some(blocks),
            Some(MessageContent::Opaque(_)) | None => None,
        }
    }

    /// Copy of this message with its content replaced.
    pub fn with_blocks(&self, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: self.role.clone(),
            content: Some(MessageContent::Blocks(blocks)),
            extra: self.extra.clone(),
        }
    }
}

/// A message's `content` field.
///
/// Anything other than an array (a bare string, `null`, an object) is carried
/// as [`MessageContent::Opaque`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MessageContent {
    Blocks(Vec<ContentBlock>),
    Opaque(Value),
}

impl From<Value> for MessageContent {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                MessageContent::Blocks(items.into_iter().map(ContentBlock::from).collect())
            }
            other => MessageContent::Opaque(other),
        }
    }
}

impl From<MessageContent> for Value {
    fn from(content: MessageContent) -> Self {
        match content {
            MessageContent::Blocks(blocks) => {
                Value::Array(blocks.into_iter().map(Value::from).collect())
            }
            MessageContent::Opaque(value) => value,
        }
    }
}
