use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Result message closing a query
#[derive(Debug, Clone, Deserialize)]
pub struct ResultMessage {
    pub subtype: ResultSubtype,
    pub is_error: bool,
    pub duration_ms: u64,
    #[serde(default)]
    pub duration_api_ms: u64,
    pub num_turns: i32,
    pub session_id: String,

    #[serde(default)]
    pub total_cost_usd: Option<f64>,

    #[serde(default)]
    pub usage: Option<Value>,

    #[serde(default)]
    pub result: Option<String>,

    /// Error messages when `is_error` is true
    #[serde(default)]
    pub errors: Vec<String>,

    #[serde(default)]
    pub uuid: Option<String>,
}

/// Result subtypes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultSubtype {
    Success,
    ErrorMaxTurns,
    ErrorDuringExecution,
    /// A subtype not yet known to this version of the crate.
    Unknown(String),
}

impl ResultSubtype {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::ErrorMaxTurns => "error_max_turns",
            Self::ErrorDuringExecution => "error_during_execution",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ResultSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResultSubtype {
    fn from(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "error_max_turns" => Self::ErrorMaxTurns,
            "error_during_execution" => Self::ErrorDuringExecution,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ResultSubtype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}
