//! Smoke test for the Claude agent CLI.
//!
//! The crate sends one prompt to the `claude` CLI in JSON streaming mode and
//! prints every message it streams back: its type name and each attribute,
//! cut to 200 characters. The point is to see, by eye, that credentials and
//! the CLI are set up correctly.
//!
//! # Quick Start
//!
//! ```no_run
//! use claude_smoke::{ClaudeAgent, Probe, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProbeConfig::from_env();
//!     let agent = ClaudeAgent::new(config.cli_builder());
//!
//!     let mut probe = Probe::new(config, std::io::stdout());
//!     let outcome = probe.run(&agent).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`probe`] - The diagnostic runner and its report format
//! - [`client`] - The [`AgentClient`] / [`MessageStream`] seam and the CLI-backed client
//! - [`cli`] - Builder for the `claude` command line
//! - [`io`] - Typed messages parsed from `stream-json` lines
//! - [`inspect`] - The [`Inspect`] capability used to print messages
//! - [`credentials`] - Presence checks for credential variables
//! - [`config`] - Probe configuration
//! - [`version`] - CLI version compatibility checking
//! - [`error`] - Error types and result aliases

pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod inspect;
pub mod io;
pub mod probe;
pub mod version;

pub use cli::ClaudeCliBuilder;
pub use client::{AgentClient, ClaudeAgent, MessageStream, QueryStream};
pub use config::ProbeConfig;
pub use credentials::CredentialStatus;
pub use error::{Error, Result};
pub use inspect::{Attribute, Inspect};
pub use io::{AgentMessage, ContentBlock, ParseError};
pub use probe::{Probe, ProbeOutcome};
