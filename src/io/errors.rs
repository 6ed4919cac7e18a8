use serde_json::Value;
use std::fmt;

/// Error type for parsing failures that preserves the raw line
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The line exactly as it was read from the CLI
    pub raw_line: String,
    /// The parsed JSON value, if the line was valid JSON at all
    pub raw_json: Option<Value>,
    /// The underlying serde error message
    pub error_message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse agent message: {}", self.error_message)
    }
}

impl std::error::Error for ParseError {}
