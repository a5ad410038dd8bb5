//! Provider reasoning signatures.
//!
//! A thinking block's signature arrives either as a JSON object or as a string
//! holding serialized JSON. Both shapes are folded into [`ReasoningSignature`]
//! here so the sanitizer only ever sees "valid signature" or "none".

use serde_json::{Map, Value};

/// Id prefixes the provider issues for reasoning items.
pub const REASONING_ID_PREFIXES: [&str; 2] = ["rs_", "s_"];

const REASONING_KIND: &str = "reasoning";
const REASONING_KIND_PREFIX: &str = "reasoning.";
const ID_KEY: &str = "id";
const KIND_KEY: &str = "type";

/// A parsed, validated reasoning signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningSignature {
    pub id: String,
    pub kind: String,
}

impl ReasoningSignature {
    /// Parse a raw `thinkingSignature` value.
    ///
    /// Returns `None` for anything that is not a valid reasoning signature:
    /// strings that are not a single JSON object, JSON that fails to parse,
    /// non-object values, non-string `id`/`type`, unknown id prefixes and
    /// non-reasoning kinds.
    pub fn parse(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(text) => {
                parse_json_object(text).and_then(|fields| Self::from_fields(&fields))
            }
            Value::Object(fields) => Self::from_fields(fields),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        let id_ok = REASONING_ID_PREFIXES
            .iter()
            .any(|prefix| self.id.starts_with(prefix));
        let kind_ok = self.kind == REASONING_KIND || self.kind.starts_with(REASONING_KIND_PREFIX);

        id_ok && kind_ok
    }

    fn from_fields(fields: &Map<String, Value>) -> Option<Self> {
        let signature = Self {
            id: string_field(fields, ID_KEY),
            kind: string_field(fields, KIND_KEY),
        };

        signature.is_valid().then_some(signature)
    }
}

/// Missing or non-string fields read as empty, which never validates.
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return None;
    }

    match serde_json::from_str(trimmed) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}
