//! Probe configuration.
//!
//! Defaults reproduce the fixed smoke test; a few environment variables allow
//! pointing it at a different binary or model without adding a CLI surface.

use crate::cli::ClaudeCliBuilder;
use crate::credentials::{API_KEY_VAR, OAUTH_TOKEN_VAR};
use log::warn;
use std::path::PathBuf;

/// Prompt sent by the smoke test
pub const DEFAULT_PROMPT: &str = "Say hello in one word";

/// Attribute values longer than this many characters are cut
pub const DEFAULT_MAX_ATTR_CHARS: usize = 200;

/// Overrides the path of the `claude` binary
pub const CLI_PATH_VAR: &str = "CLAUDE_SMOKE_CLI_PATH";

/// Overrides the model alias passed with `--model`
pub const MODEL_VAR: &str = "CLAUDE_SMOKE_MODEL";

/// Overrides the model alias passed with `--fallback-model`
pub const FALLBACK_MODEL_VAR: &str = "CLAUDE_SMOKE_FALLBACK_MODEL";

/// Caps the agent turns with `--max-turns`
pub const MAX_TURNS_VAR: &str = "CLAUDE_SMOKE_MAX_TURNS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub prompt: String,
    pub cli_path: PathBuf,
    pub model: Option<String>,
    pub fallback_model: Option<String>,
    pub max_turns: Option<u32>,
    /// Credential variables reported by presence, primary first
    pub credential_vars: Vec<String>,
    pub max_attr_chars: usize,
    pub check_version: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            cli_path: PathBuf::from("claude"),
            model: None,
            fallback_model: None,
            max_turns: None,
            credential_vars: vec![OAUTH_TOKEN_VAR.to_string(), API_KEY_VAR.to_string()],
            max_attr_chars: DEFAULT_MAX_ATTR_CHARS,
            check_version: true,
        }
    }
}

impl ProbeConfig {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from `lookup`; empty values are ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(path) = non_empty(CLI_PATH_VAR) {
            config.cli_path = PathBuf::from(path);
        }
        config.model = non_empty(MODEL_VAR);
        config.fallback_model = non_empty(FALLBACK_MODEL_VAR);
        config.max_turns = non_empty(MAX_TURNS_VAR).and_then(|raw| match raw.trim().parse() {
            Ok(turns) => Some(turns),
            Err(e) => {
                warn!("Ignoring {}={:?}: {}", MAX_TURNS_VAR, raw, e);
                None
            }
        });
        config
    }

    /// CLI builder for the configured binary and flags, without a prompt
    pub fn cli_builder(&self) -> ClaudeCliBuilder {
        let mut builder = ClaudeCliBuilder::new().command(&self.cli_path);
        if let Some(ref model) = self.model {
            builder = builder.model(model);
        }
        if let Some(ref model) = self.fallback_model {
            builder = builder.fallback_model(model);
        }
        if let Some(turns) = self.max_turns {
            builder = builder.max_turns(turns);
        }
        builder
    }
}
