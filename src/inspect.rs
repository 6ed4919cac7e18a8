//! Debug introspection for streamed messages.
//!
//! [`Inspect`] is how a message describes itself for the diagnostic report: a
//! class-like type name and an ordered list of attributes rendered as text.
//! Types that cannot describe their fields return `None` from
//! [`Inspect::attributes`] and are printed with a placeholder. Structured
//! values are rendered as compact JSON.

use crate::io::{
    AgentMessage, AssistantMessage, ResultMessage, StreamEvent, SystemMessage, UserMessage,
};
use serde::Serialize;
use serde_json::Value;

/// Placeholder printed for messages without an attribute listing
pub const UNSUPPORTED_FOR_INSPECTION: &str = "<unsupported for inspection>";

/// A named attribute and its rendered value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute for an optional string; absent values render as `None`
    pub fn optional<N: Into<String>>(name: N, value: Option<&str>) -> Self {
        Self::new(name, value.unwrap_or("None"))
    }

    /// Attribute for any serializable value, rendered as compact JSON
    pub fn json<N: Into<String>, V: Serialize + ?Sized>(name: N, value: &V) -> Self {
        let rendered = serde_json::to_string(value)
            .unwrap_or_else(|e| format!("<not serializable: {}>", e));
        Self::new(name, rendered)
    }

    /// Attribute for a JSON value; strings are shown without quotes
    pub fn field<N: Into<String>>(name: N, value: &Value) -> Self {
        match value {
            Value::String(s) => Self::new(name, s.as_str()),
            other => Self::json(name, other),
        }
    }

    /// The value cut to at most `max_chars` characters
    pub fn truncated_value(&self, max_chars: usize) -> &str {
        truncate_chars(&self.value, max_chars)
    }
}

/// Introspection capability used by the probe report
pub trait Inspect {
    /// Class-like name of the value, e.g. `AssistantMessage`
    fn type_name(&self) -> &str;

    /// Ordered attributes, or `None` when the value cannot be inspected
    fn attributes(&self) -> Option<Vec<Attribute>>;
}

/// Cut `s` after `max_chars` Unicode scalar values.
///
/// ```
/// use claude_smoke::inspect::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("hi", 200), "hi");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

impl Inspect for UserMessage {
    fn type_name(&self) -> &str {
        "UserMessage"
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        Some(vec![
            Attribute::json("content", &self.message.content),
            Attribute::optional("uuid", self.uuid.as_deref()),
            Attribute::optional("parent_tool_use_id", self.parent_tool_use_id.as_deref()),
            Attribute::json(
                "tool_use_result",
                self.tool_use_result.as_ref().unwrap_or(&Value::Null),
            ),
        ])
    }
}

impl Inspect for AssistantMessage {
    fn type_name(&self) -> &str {
        "AssistantMessage"
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        Some(vec![
            Attribute::json("content", &self.message.content),
            Attribute::new("model", self.message.model.as_str()),
            Attribute::optional("parent_tool_use_id", self.parent_tool_use_id.as_deref()),
            Attribute::optional("error", self.error.as_deref()),
        ])
    }
}

impl Inspect for SystemMessage {
    fn type_name(&self) -> &str {
        "SystemMessage"
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        Some(vec![
            Attribute::new("subtype", self.subtype.as_str()),
            Attribute::json("data", &self.data),
        ])
    }
}

impl Inspect for ResultMessage {
    fn type_name(&self) -> &str {
        "ResultMessage"
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        let cost = match self.total_cost_usd {
            Some(cost) => cost.to_string(),
            None => "None".to_string(),
        };
        Some(vec![
            Attribute::new("subtype", self.subtype.as_str()),
            Attribute::new("duration_ms", self.duration_ms.to_string()),
            Attribute::new("duration_api_ms", self.duration_api_ms.to_string()),
            Attribute::new("is_error", self.is_error.to_string()),
            Attribute::new("num_turns", self.num_turns.to_string()),
            Attribute::new("session_id", self.session_id.as_str()),
            Attribute::new("total_cost_usd", cost),
            Attribute::json("usage", self.usage.as_ref().unwrap_or(&Value::Null)),
            Attribute::optional("result", self.result.as_deref()),
        ])
    }
}

impl Inspect for StreamEvent {
    fn type_name(&self) -> &str {
        "StreamEvent"
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        Some(vec![
            Attribute::new("uuid", self.uuid.as_str()),
            Attribute::new("session_id", self.session_id.as_str()),
            Attribute::json("event", &self.event),
            Attribute::optional("parent_tool_use_id", self.parent_tool_use_id.as_deref()),
        ])
    }
}

impl Inspect for AgentMessage {
    fn type_name(&self) -> &str {
        match self {
            AgentMessage::System(msg) => msg.type_name(),
            AgentMessage::User(msg) => msg.type_name(),
            AgentMessage::Assistant(msg) => msg.type_name(),
            AgentMessage::Result(msg) => msg.type_name(),
            AgentMessage::StreamEvent(msg) => msg.type_name(),
            AgentMessage::Unknown(_) => "UnknownMessage",
        }
    }

    fn attributes(&self) -> Option<Vec<Attribute>> {
        match self {
            AgentMessage::System(msg) => msg.attributes(),
            AgentMessage::User(msg) => msg.attributes(),
            AgentMessage::Assistant(msg) => msg.attributes(),
            AgentMessage::Result(msg) => msg.attributes(),
            AgentMessage::StreamEvent(msg) => msg.attributes(),
            AgentMessage::Unknown(raw) => raw.as_object().map(|fields| {
                fields
                    .iter()
                    .map(|(name, value)| Attribute::field(name.as_str(), value))
                    .collect()
            }),
        }
    }
}
