//! Agent client seam and its Claude CLI implementation.
//!
//! [`AgentClient`] issues one query and hands back a [`MessageStream`]. The
//! probe only depends on these two traits; [`ClaudeAgent`] backs them with a
//! `claude --print` child process whose stdout is read as JSON lines.

use crate::cli::ClaudeCliBuilder;
use crate::error::{Error, Result};
use crate::inspect::Inspect;
use crate::io::AgentMessage;
use crate::version;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::task::JoinHandle;

/// Buffer size for reading Claude's stdout (10MB).
const STDOUT_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// A finite, non-restartable sequence of messages
#[allow(async_fn_in_trait)]
pub trait MessageStream {
    type Item: Inspect;

    /// Next message in arrival order; `None` once the source has closed
    async fn next_message(&mut self) -> Option<Result<Self::Item>>;
}

/// Something that can answer a prompt with a stream of messages
#[allow(async_fn_in_trait)]
pub trait AgentClient {
    type Stream: MessageStream;

    async fn query(&self, prompt: &str) -> Result<Self::Stream>;
}

/// Agent client that spawns the Claude CLI once per query
#[derive(Debug, Clone)]
pub struct ClaudeAgent {
    builder: ClaudeCliBuilder,
    check_version: bool,
}

impl ClaudeAgent {
    /// Create a client from a builder template; the prompt is set per query
    pub fn new(builder: ClaudeCliBuilder) -> Self {
        Self {
            builder,
            check_version: true,
        }
    }

    /// Enable or disable the one-time CLI version check
    pub fn check_version(mut self, check: bool) -> Self {
        self.check_version = check;
        self
    }
}

impl Default for ClaudeAgent {
    fn default() -> Self {
        Self::new(ClaudeCliBuilder::new())
    }
}

impl AgentClient for ClaudeAgent {
    type Stream = QueryStream;

    async fn query(&self, prompt: &str) -> Result<QueryStream> {
        if self.check_version {
            if let Some(found) = version::check_claude_version(self.builder.command_path()).await
            {
                info!("Using Claude CLI version {}", found);
            }
        }

        let child = self.builder.clone().prompt(prompt).spawn().await?;
        info!("Started Claude process (pid {:?})", child.id());
        QueryStream::new(child)
    }
}

/// Messages read from a running `claude --print` process
pub struct QueryStream {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    finished: bool,
}

impl QueryStream {
    /// Take over a spawned child whose stdout and stderr are piped
    pub fn new(mut child: Child) -> Result<Self> {
        let stdout = BufReader::with_capacity(
            STDOUT_BUFFER_SIZE,
            child
                .stdout
                .take()
                .ok_or_else(|| Error::Io(std::io::Error::other("Failed to get stdout handle")))?,
        );

        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(drain_stderr(stderr)));

        Ok(Self {
            child,
            stdout,
            stderr_task,
            finished: false,
        })
    }

    /// Read lines until one parses into a message or the stream ends
    async fn read_message(&mut self) -> Result<Option<AgentMessage>> {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self.stdout.read_line(&mut line).await.map_err(Error::Io)?;

            if bytes_read == 0 {
                self.wait_for_exit().await?;
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("[INCOMING] Received JSON from Claude: {}", trimmed);

            return match AgentMessage::parse_json_tolerant(trimmed) {
                Ok(message) => {
                    debug!("[INCOMING] Parsed message type: {}", message.message_type());
                    Ok(Some(message))
                }
                Err(parse_error) => {
                    warn!("[INCOMING] Failed to deserialize message from Claude CLI");
                    warn!("[INCOMING] Raw message: {}", trimmed);
                    Err(Error::Deserialization(parse_error))
                }
            };
        }
    }

    /// Reap the child after EOF; a failing exit status becomes an error
    async fn wait_for_exit(&mut self) -> Result<()> {
        let status = self.child.wait().await.map_err(Error::Io)?;
        let stderr = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                error!("stderr reader task failed: {}", e);
                String::new()
            }),
            None => String::new(),
        };

        if status.success() {
            debug!("Claude process exited cleanly");
            Ok(())
        } else {
            Err(Error::ProcessFailed {
                code: status.code(),
                stderr,
            })
        }
    }

    /// Check if the Claude process is still running
    pub fn is_alive(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Get the process ID
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

impl MessageStream for QueryStream {
    type Item = AgentMessage;

    async fn next_message(&mut self) -> Option<Result<AgentMessage>> {
        if self.finished {
            return None;
        }

        match self.read_message().await {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl Drop for QueryStream {
    fn drop(&mut self) {
        if self.is_alive() {
            if let Err(e) = self.child.start_kill() {
                error!("Failed to kill Claude process on drop: {}", e);
            }
        }
    }
}

/// Collect stderr so the child never blocks on a full pipe
async fn drain_stderr(stderr: ChildStderr) -> String {
    let mut collected = String::new();
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if !line.trim().is_empty() {
                    debug!("[STDERR] {}", line.trim());
                }
                collected.push_str(&line);
                collected.push('\n');
            }
            Ok(None) => break,
            Err(e) => {
                error!("Error reading stderr: {}", e);
                break;
            }
        }
    }
    collected
}
