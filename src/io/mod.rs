//! Message types streamed back by the Claude CLI.
//!
//! - [`AgentMessage`] - One parsed line of `stream-json` output
//! - [`ContentBlock`] - Different types of content within messages
//! - [`ParseError`] - A line that could not be parsed, with the raw input kept
//!
//! # Example
//!
//! ```
//! use claude_smoke::AgentMessage;
//!
//! let json = r#"{"type":"system","subtype":"init","session_id":"abc"}"#;
//! match AgentMessage::parse_json(json) {
//!     Ok(message) => println!("Got: {}", message.message_type()),
//!     Err(e) => eprintln!("Parse error: {}", e),
//! }
//! ```

mod agent_message;
mod content_blocks;
mod errors;
mod message_types;
mod result;

pub use agent_message::*;
pub use content_blocks::*;
pub use errors::*;
pub use message_types::*;
pub use result::*;
