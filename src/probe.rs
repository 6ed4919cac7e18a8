//! The diagnostic runner.
//!
//! [`Probe::run`] prints credential presence, sends one prompt, and reports
//! every streamed message. It is the single catch-all boundary: any failure
//! from the agent client is printed with a trace and the run still returns
//! normally. Only failures to write the report itself are propagated.

use crate::client::{AgentClient, MessageStream};
use crate::config::ProbeConfig;
use crate::credentials::CredentialStatus;
use crate::error::Error;
use crate::inspect::{Inspect, UNSUPPORTED_FOR_INSPECTION};
use log::{debug, info, warn};
use std::io::{self, Write};

/// Line printed after a stream completes without error
pub const SUCCESS_LINE: &str = "Success! Claude agent client works!";

/// Line printed after each message block
pub const SEPARATOR: &str = "---";

/// How a probe run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Succeeded { messages: usize },
    Failed { messages: usize, error: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Succeeded { .. })
    }

    /// Number of message blocks printed before the run ended
    pub fn messages(&self) -> usize {
        match self {
            ProbeOutcome::Succeeded { messages } | ProbeOutcome::Failed { messages, .. } => {
                *messages
            }
        }
    }
}

/// Runs the smoke test and writes the report to `out`
pub struct Probe<W> {
    config: ProbeConfig,
    out: W,
}

impl<W: Write> Probe<W> {
    pub fn new(config: ProbeConfig, out: W) -> Self {
        Self { config, out }
    }

    /// Give back the writer, e.g. to inspect a buffered report
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Full run with credentials read from the process environment
    pub async fn run<C: AgentClient>(&mut self, client: &C) -> io::Result<ProbeOutcome> {
        let statuses: Vec<CredentialStatus> = self
            .config
            .credential_vars
            .iter()
            .map(|name| CredentialStatus::check(name))
            .collect();
        self.run_with_credentials(client, &statuses).await
    }

    /// Full run with pre-computed credential statuses
    pub async fn run_with_credentials<C: AgentClient>(
        &mut self,
        client: &C,
        credentials: &[CredentialStatus],
    ) -> io::Result<ProbeOutcome> {
        writeln!(self.out, "Testing Claude agent client...")?;
        for status in credentials {
            writeln!(self.out, "{}", status)?;
        }
        if !credentials.iter().any(|status| status.is_set) {
            warn!("No credential variable is set; relying on the CLI's stored login");
        }

        let mut printed = 0;
        let streamed = self.stream_messages(client, &mut printed).await?;

        match streamed {
            Ok(()) => {
                writeln!(self.out)?;
                writeln!(self.out, "{}", SUCCESS_LINE)?;
                info!("Probe succeeded after {} messages", printed);
                Ok(ProbeOutcome::Succeeded { messages: printed })
            }
            Err(failure) => {
                writeln!(self.out, "Error: {}", failure.message)?;
                writeln!(self.out, "{:?}", failure.trace)?;
                info!("Probe failed after {} messages: {}", printed, failure.message);
                Ok(ProbeOutcome::Failed {
                    messages: printed,
                    error: failure.message,
                })
            }
        }
    }

    /// Issue the query and print every message.
    ///
    /// The outer result carries report write failures; the inner one carries
    /// the agent failure that ended the stream, if any.
    async fn stream_messages<C: AgentClient>(
        &mut self,
        client: &C,
        printed: &mut usize,
    ) -> io::Result<Result<(), Failure>> {
        debug!("Sending prompt: {}", self.config.prompt);
        let mut stream = match client.query(&self.config.prompt).await {
            Ok(stream) => stream,
            Err(error) => {
                return Ok(Err(Failure::capture(
                    error,
                    "failed to start the agent query".to_string(),
                )))
            }
        };

        while let Some(next) = stream.next_message().await {
            match next {
                Ok(message) => {
                    self.print_message(&message)?;
                    *printed += 1;
                }
                Err(error) => {
                    let stage = format!("failed while reading message #{}", *printed + 1);
                    return Ok(Err(Failure::capture(error, stage)));
                }
            }
        }
        Ok(Ok(()))
    }

    /// Print one message block followed by the separator
    pub fn print_message<M: Inspect + ?Sized>(&mut self, message: &M) -> io::Result<()> {
        writeln!(self.out, "Message class: {}", message.type_name())?;
        match message.attributes() {
            Some(attributes) => {
                let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
                writeln!(self.out, "Message attrs: {:?}", names)?;
                for attribute in &attributes {
                    writeln!(
                        self.out,
                        "  {}: {}",
                        attribute.name,
                        attribute.truncated_value(self.config.max_attr_chars)
                    )?;
                }
            }
            None => writeln!(self.out, "Message attrs: {}", UNSUPPORTED_FOR_INSPECTION)?,
        }
        writeln!(self.out, "{}", SEPARATOR)
    }
}

/// An agent error and its trace, captured as soon as the stream reports it
struct Failure {
    message: String,
    trace: anyhow::Error,
}

impl Failure {
    fn capture(error: Error, stage: String) -> Self {
        let message = error.to_string();
        let trace = anyhow::Error::new(error).context(stage);
        Self { message, trace }
    }
}
