//! Builder for launching the Claude CLI for a single streamed query.
//!
//! [`ClaudeCliBuilder`] always configures:
//!
//! - `--output-format stream-json` so every message arrives as one JSON line
//! - `--verbose`, which the CLI requires for stream-json in print mode
//! - `--print -- <prompt>` as the final arguments, so the query is one-shot
//!
//! Credentials are inherited from the environment of the calling process.
//!
//! # Example
//!
//! ```no_run
//! use claude_smoke::ClaudeCliBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let child = ClaudeCliBuilder::new()
//!     .model("sonnet")
//!     .prompt("Say hello in one word")
//!     .spawn()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use uuid::Uuid;

/// Builder for one-shot Claude CLI invocations in JSON streaming mode
#[derive(Debug, Clone)]
pub struct ClaudeCliBuilder {
    command: PathBuf,
    prompt: Option<String>,
    model: Option<String>,
    fallback_model: Option<String>,
    max_turns: Option<u32>,
    session_id: Option<String>,
}

impl Default for ClaudeCliBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeCliBuilder {
    /// Create a builder that runs `claude` from `PATH`
    pub fn new() -> Self {
        Self {
            command: PathBuf::from("claude"),
            prompt: None,
            model: None,
            fallback_model: None,
            max_turns: None,
            session_id: None,
        }
    }

    /// Set custom path to Claude binary
    pub fn command<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.command = path.into();
        self
    }

    /// Path of the binary that will be spawned
    pub fn command_path(&self) -> &PathBuf {
        &self.command
    }

    /// Set the prompt for the query
    pub fn prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the model to use
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set fallback model for overload situations
    pub fn fallback_model<S: Into<String>>(mut self, model: S) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    /// Limit the number of agent turns
    pub fn max_turns(mut self, turns: u32) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Set a specific session ID
    pub fn session_id<S: Into<String>>(mut self, id: S) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Build the command arguments (always includes JSON streaming flags)
    fn build_args(&self) -> Vec<String> {
        // --print with stream-json requires --verbose
        let mut args = vec![
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
        ];

        if let Some(turns) = self.max_turns {
            args.push("--max-turns".to_string());
            args.push(turns.to_string());
        }

        if let Some(ref model) = self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }

        if let Some(ref model) = self.fallback_model {
            args.push("--fallback-model".to_string());
            args.push(model.clone());
        }

        args.push("--session-id".to_string());
        if let Some(ref id) = self.session_id {
            args.push(id.clone());
        } else {
            let uuid = Uuid::new_v4();
            debug!("[CLI] Generated session UUID: {}", uuid);
            args.push(uuid.to_string());
        }

        // The prompt goes last, after `--`, so a leading dash is never a flag
        args.push("--print".to_string());
        if let Some(ref prompt) = self.prompt {
            args.push("--".to_string());
            args.push(prompt.clone());
        }

        args
    }

    /// Build a Command without spawning
    pub fn build_command(&self) -> Command {
        let args = self.build_args();
        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            "[CLI] Executing command: {} {}",
            self.command.display(),
            args.join(" ")
        );
        cmd
    }

    /// Spawn the Claude process
    pub async fn spawn(&self) -> Result<Child> {
        self.build_command().spawn().map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], flag: &str) -> usize {
        args.iter()
            .position(|a| a == flag)
            .unwrap_or_else(|| panic!("missing {}", flag))
    }

    #[test]
    fn test_streaming_flags_always_present() {
        let args = ClaudeCliBuilder::new().build_args();

        assert!(args.contains(&"--print".to_string()));
        assert!(args.contains(&"--verbose".to_string()));
        let fmt = position(&args, "--output-format");
        assert_eq!(args[fmt + 1], "stream-json");
        assert!(!args.contains(&"--input-format".to_string()));
    }

    #[test]
    fn test_prompt_is_last_after_separator() {
        let args = ClaudeCliBuilder::new()
            .prompt("-starts with a dash")
            .model("sonnet")
            .build_args();

        let n = args.len();
        assert_eq!(args[n - 3], "--print");
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "-starts with a dash");
    }

    #[test]
    fn test_with_model() {
        let args = ClaudeCliBuilder::new()
            .model("sonnet")
            .fallback_model("opus")
            .build_args();

        assert_eq!(args[position(&args, "--model") + 1], "sonnet");
        assert_eq!(args[position(&args, "--fallback-model") + 1], "opus");
    }

    #[test]
    fn test_generated_session_id_is_uuid() {
        let args = ClaudeCliBuilder::new().build_args();
        let id = &args[position(&args, "--session-id") + 1];
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_explicit_session_id() {
        let args = ClaudeCliBuilder::new().session_id("my-session").build_args();
        assert_eq!(args[position(&args, "--session-id") + 1], "my-session");
    }

    #[test]
    fn test_max_turns() {
        let args = ClaudeCliBuilder::new().max_turns(1).build_args();
        assert_eq!(args[position(&args, "--max-turns") + 1], "1");
        assert!(position(&args, "--max-turns") < position(&args, "--print"));
    }

    #[test]
    fn test_optional_flags_absent_by_default() {
        let args = ClaudeCliBuilder::new().build_args();
        assert!(!args.contains(&"--max-turns".to_string()));
        assert!(!args.contains(&"--model".to_string()));
        assert!(!args.contains(&"--fallback-model".to_string()));
    }

    #[test]
    fn test_command_path() {
        let builder = ClaudeCliBuilder::new().command("/opt/claude/bin/claude");
        assert_eq!(
            builder.command_path(),
            &PathBuf::from("/opt/claude/bin/claude")
        );
    }
}
