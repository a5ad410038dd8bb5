use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag value identifying a reasoning block.
pub const THINKING_BLOCK_TYPE: &str = "thinking";

const TYPE_KEY: &str = "type";
const THINKING_KEY: &str = "thinking";
const SIGNATURE_KEY: &str = "thinkingSignature";

/// A single block inside a message's content array.
///
/// Only `thinking` blocks are distinguished. Anything else, including values
/// that are not JSON objects at all, is kept as-is in [`ContentBlock::Opaque`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ContentBlock {
    Thinking(ThinkingBlock),
    Opaque(Value),
}

impl ContentBlock {
    /// A `{"type": "text", "text": ...}` block.
    pub fn text(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_KEY.to_string(), Value::String("text".to_string()));
        fields.insert("text".to_string(), Value::String(text.into()));
        ContentBlock::Opaque(Value::Object(fields))
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, ContentBlock::Thinking(_))
    }

    /// The block's `type` tag, if it has a string one.
    pub fn block_type(&self) -> Option<&str> {
        match self {
            ContentBlock::Thinking(_) => Some(THINKING_BLOCK_TYPE),
            ContentBlock::Opaque(value) => value.get(TYPE_KEY).and_then(Value::as_str),
        }
    }

    pub fn as_thinking(&self) -> Option<&ThinkingBlock> {
        match self {
            ContentBlock::Thinking(block) => Some(block),
            ContentBlock::Opaque(_) => None,
        }
    }
}

impl From<ThinkingBlock> for ContentBlock {
    fn from(block: ThinkingBlock) -> Self {
        ContentBlock::Thinking(block)
    }
}

impl From<Value> for ContentBlock {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut fields)
                if fields.get(TYPE_KEY).and_then(Value::as_str) == Some(THINKING_BLOCK_TYPE) =>
            {
                fields.remove(TYPE_KEY);
                ContentBlock::Thinking(ThinkingBlock { fields })
            }
            other => ContentBlock::Opaque(other),
        }
    }
}

impl From<ContentBlock> for Value {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Thinking(ThinkingBlock { mut fields }) => {
                fields.insert(
                    TYPE_KEY.to_string(),
                    Value::String(THINKING_BLOCK_TYPE.to_string()),
                );
                Value::Object(fields)
            }
            ContentBlock::Opaque(value) => value,
        }
    }
}

/// A reasoning segment of an assistant turn.
///
/// Fields are stored raw. The signature in particular must survive replay
/// byte-for-byte, whatever shape the provider gave it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThinkingBlock {
    fields: Map<String, Value>,
}

impl ThinkingBlock {
    pub fn new(thinking: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(THINKING_KEY.to_string(), Value::String(thinking.into()));
        Self { fields }
    }

    pub fn with_signature(mut self, signature: impl Into<Value>) -> Self {
        self.fields
            .insert(SIGNATURE_KEY.to_string(), signature.into());
        self
    }

    pub fn thinking(&self) -> Option<&str> {
        self.fields.get(THINKING_KEY).and_then(Value::as_str)
    }

    /// Raw provider signature. `null` counts as absent.
    pub fn signature(&self) -> Option<&Value> {
        self.fields.get(SIGNATURE_KEY).filter(|value| !value.is_null())
    }
}
