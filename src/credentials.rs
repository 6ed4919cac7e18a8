//! Presence checks for credential environment variables.
//!
//! Only presence is inspected; values are never printed or validated.

use std::fmt;

/// Variable read by the CLI for OAuth (subscription) authentication
pub const OAUTH_TOKEN_VAR: &str = "CLAUDE_CODE_OAUTH_TOKEN";

/// Variable read by the CLI for API key authentication
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Whether one credential variable is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    pub name: String,
    pub is_set: bool,
}

impl CredentialStatus {
    /// Check the process environment
    pub fn check(name: &str) -> Self {
        Self::from_lookup(name, |key| {
            std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Check using an arbitrary lookup; any non-empty value counts as set
    pub fn from_lookup<F>(name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = lookup(name).is_some_and(|value| !value.is_empty());
        Self {
            name: name.to_string(),
            is_set,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.is_set {
            "SET"
        } else {
            "NOT SET"
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.label())
    }
}
