use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a conversation message.
///
/// Unrecognised role names are kept in [`Role::Other`]. A `role` that is not a
/// string at all (`null`, a number, an object) is kept as-is in [`Role::Raw`]
/// so the message still loads and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    ToolResult,
    Other(String),
    Raw(Value),
}

impl Role {
    /// Role name, if the stored role was a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Role::User => Some("user"),
            Role::Assistant => Some("assistant"),
            Role::System => Some("system"),
            Role::Tool => Some("tool"),
            Role::ToolResult => Some("toolResult"),
            Role::Other(role) => Some(role),
            Role::Raw(_) => None,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            "tool" => Role::Tool,
            "toolResult" => Role::ToolResult,
            _ => Role::Other(role),
        }
    }
}

impl From<Value> for Role {
    fn from(value: Value) -> Self {
        match value {
            Value::String(role) => Role::from(role),
            other => Role::Raw(other),
        }
    }
}

impl From<Role> for Value {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => Value::String(role),
            Role::Raw(value) => value,
            known => Value::String(known.as_str().unwrap_or_default().to_string()),
        }
    }
}
