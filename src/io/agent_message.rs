use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::content_blocks::ContentBlock;
use super::errors::ParseError;
use super::message_types::{AssistantMessage, StreamEvent, SystemMessage, UserMessage};
use super::result::ResultMessage;

/// Top-level enum for every message the CLI streams back
#[derive(Debug, Clone)]
pub enum AgentMessage {
    /// System message (init, status, ...)
    System(SystemMessage),

    /// User message echoed back, usually a tool result
    User(UserMessage),

    /// Assistant response
    Assistant(AssistantMessage),

    /// Result message closing the query
    Result(ResultMessage),

    /// Raw API stream event (partial messages)
    StreamEvent(StreamEvent),

    /// Valid JSON object with a `type` this crate does not know
    Unknown(Value),
}

impl AgentMessage {
    /// Get the wire `type` tag of the message
    pub fn message_type(&self) -> &str {
        match self {
            AgentMessage::System(_) => "system",
            AgentMessage::User(_) => "user",
            AgentMessage::Assistant(_) => "assistant",
            AgentMessage::Result(_) => "result",
            AgentMessage::StreamEvent(_) => "stream_event",
            AgentMessage::Unknown(raw) => raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// Check if this is a result message
    pub fn is_result(&self) -> bool {
        matches!(self, AgentMessage::Result(_))
    }

    /// Get the session ID from any message type that carries one
    pub fn session_id(&self) -> Option<&str> {
        match self {
            AgentMessage::System(sys) => sys.session_id(),
            AgentMessage::User(user) => user.session_id.as_deref(),
            AgentMessage::Assistant(ass) => ass.session_id.as_deref(),
            AgentMessage::Result(res) => Some(&res.session_id),
            AgentMessage::StreamEvent(evt) => Some(&evt.session_id),
            AgentMessage::Unknown(raw) => raw.get("session_id").and_then(Value::as_str),
        }
    }

    /// Concatenated text blocks of an assistant message
    ///
    /// # Example
    /// ```
    /// use claude_smoke::AgentMessage;
    ///
    /// let json = r#"{"type":"assistant","message":{"model":"claude-sonnet-4-5",
    ///     "content":[{"type":"text","text":"Hello"}]},"session_id":"abc"}"#;
    /// let msg = AgentMessage::parse_json(json).unwrap();
    /// assert_eq!(msg.text_content(), Some("Hello".to_string()));
    /// ```
    pub fn text_content(&self) -> Option<String> {
        let AgentMessage::Assistant(ass) = self else {
            return None;
        };
        let texts: Vec<&str> = ass
            .message
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join(""))
        }
    }

    /// Parse a line, tolerating a non-JSON prefix such as ANSI escape codes
    ///
    /// This method will:
    /// 1. First try to parse as-is
    /// 2. If that fails, trim until it finds a '{' and try again
    pub fn parse_json_tolerant(s: &str) -> Result<AgentMessage, ParseError> {
        match Self::parse_json(s) {
            Ok(output) => Ok(output),
            Err(first_error) => match s.find('{') {
                Some(json_start) if json_start > 0 => {
                    Self::parse_json(&s[json_start..]).map_err(|_| first_error)
                }
                _ => Err(first_error),
            },
        }
    }

    /// Parse a JSON line, dispatching on its `type` field
    pub fn parse_json(s: &str) -> Result<AgentMessage, ParseError> {
        let value: Value = serde_json::from_str(s).map_err(|e| ParseError {
            raw_line: s.to_string(),
            raw_json: None,
            error_message: format!("Invalid JSON: {}", e),
        })?;

        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ParseError {
                    raw_line: s.to_string(),
                    raw_json: Some(other),
                    error_message: "expected a JSON object".to_string(),
                })
            }
        };

        let message_type = match fields.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => {
                return Err(ParseError {
                    raw_line: s.to_string(),
                    raw_json: Some(Value::Object(fields)),
                    error_message: "missing string field `type`".to_string(),
                })
            }
        };

        match message_type.as_str() {
            "system" => typed(s, fields).map(AgentMessage::System),
            "user" => typed(s, fields).map(AgentMessage::User),
            "assistant" => typed(s, fields).map(AgentMessage::Assistant),
            "result" => typed(s, fields).map(AgentMessage::Result),
            "stream_event" => typed(s, fields).map(AgentMessage::StreamEvent),
            other => {
                log::debug!("[INCOMING] Unrecognised message type: {}", other);
                Ok(AgentMessage::Unknown(Value::Object(fields)))
            }
        }
    }
}

/// Deserialize the whole object into a concrete message
fn typed<T: DeserializeOwned>(
    raw_line: &str,
    fields: Map<String, Value>,
) -> Result<T, ParseError> {
    let raw = Value::Object(fields);
    T::deserialize(&raw).map_err(|e| ParseError {
        raw_line: raw_line.to_string(),
        error_message: e.to_string(),
        raw_json: Some(raw),
    })
}
