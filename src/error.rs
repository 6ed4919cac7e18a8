//! Error types for the smoke test

use crate::io::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] ParseError),

    #[error("Claude CLI exited with {}{}", exit_code_label(.code), stderr_suffix(.stderr))]
    ProcessFailed { code: Option<i32>, stderr: String },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    match stderr.trim() {
        "" => String::new(),
        trimmed => format!(": {}", trimmed),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_includes_stderr() {
        let err = Error::ProcessFailed {
            code: Some(2),
            stderr: "overloaded\n".to_string(),
        };
        assert_eq!(err.to_string(), "Claude CLI exited with status 2: overloaded");
    }

    #[test]
    fn test_process_failed_without_stderr_has_no_suffix() {
        let err = Error::ProcessFailed {
            code: Some(1),
            stderr: " \n".to_string(),
        };
        assert_eq!(err.to_string(), "Claude CLI exited with status 1");

        let killed = Error::ProcessFailed {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(
            killed.to_string(),
            "Claude CLI exited with no status (killed by signal)"
        );
    }
}
