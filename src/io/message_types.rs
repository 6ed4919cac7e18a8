use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;

use super::content_blocks::{deserialize_content_blocks, ContentBlock};

/// Known system message subtypes.
///
/// The Claude CLI emits system messages with a `subtype` field indicating what
/// kind of system event occurred. Unknown values are preserved via the
/// `Unknown` variant so a newer CLI never breaks the stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SystemSubtype {
    Init,
    Status,
    CompactBoundary,
    /// A subtype not yet known to this version of the crate.
    Unknown(String),
}

impl SystemSubtype {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Init => "init",
            Self::Status => "status",
            Self::CompactBoundary => "compact_boundary",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl fmt::Display for SystemSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SystemSubtype {
    fn from(s: &str) -> Self {
        match s {
            "init" => Self::Init,
            "status" => Self::Status,
            "compact_boundary" => Self::CompactBoundary,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SystemSubtype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// User message echoed by the CLI, usually carrying tool results
#[derive(Debug, Clone, Deserialize)]
pub struct UserMessage {
    pub message: UserMessageContent,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Structured result of the tool call this message answers, if any
    #[serde(default)]
    pub tool_use_result: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserMessageContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(deserialize_with = "deserialize_content_blocks")]
    pub content: Vec<ContentBlock>,
}

/// Assistant response
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    pub message: AssistantMessageContent,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    /// Set by the CLI when the turn failed (e.g. `authentication_failed`)
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessageContent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(deserialize_with = "deserialize_content_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Value>,
}

/// System message; `data` is the whole JSON object, `type` and `subtype` included
#[derive(Debug, Clone)]
pub struct SystemMessage {
    pub subtype: SystemSubtype,
    pub data: Map<String, Value>,
}

impl<'de> Deserialize<'de> for SystemMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = Map::<String, Value>::deserialize(deserializer)?;
        let subtype = match data.get("subtype") {
            Some(Value::String(s)) => SystemSubtype::from(s.as_str()),
            Some(_) => return Err(serde::de::Error::custom("`subtype` must be a string")),
            None => return Err(serde::de::Error::missing_field("subtype")),
        };
        Ok(Self { subtype, data })
    }
}

impl SystemMessage {
    pub fn is_init(&self) -> bool {
        self.subtype == SystemSubtype::Init
    }

    pub fn session_id(&self) -> Option<&str> {
        self.data.get("session_id").and_then(Value::as_str)
    }
}

/// Partial-message event emitted when the CLI streams raw API events
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub session_id: String,
    pub event: Value,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
}
