//! Version checking for Claude CLI compatibility

use crate::error::{Error, Result};
use log::{debug, warn};
use std::cmp::Ordering;
use std::path::Path;
use tokio::process::Command;
use tokio::sync::OnceCell;

/// Oldest CLI release that emits the stream-json messages this crate parses
pub const MINIMUM_VERSION: &str = "2.0.0";

/// The latest Claude CLI version we've tested against
pub const TESTED_VERSION: &str = "2.1.47";

static VERSION_CHECK: OnceCell<Option<String>> = OnceCell::const_new();

/// How a detected CLI version relates to the supported range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    TooOld,
    Supported,
    NewerThanTested,
}

/// Classify `version` against [`MINIMUM_VERSION`] and [`TESTED_VERSION`]
pub fn compatibility(version: &str) -> Compatibility {
    if compare_versions(version, MINIMUM_VERSION) == Ordering::Less {
        Compatibility::TooOld
    } else if compare_versions(version, TESTED_VERSION) == Ordering::Greater {
        Compatibility::NewerThanTested
    } else {
        Compatibility::Supported
    }
}

/// Check the CLI version once per process and warn when it is out of range.
///
/// Returns the detected version. Any failure to run or parse `--version` is
/// logged and yields `None`; it never aborts the caller.
pub async fn check_claude_version(command: &Path) -> Option<String> {
    VERSION_CHECK
        .get_or_init(|| async {
            match detect_version(command).await {
                Ok(Some(version)) => {
                    warn_if_incompatible(&version);
                    Some(version)
                }
                Ok(None) => None,
                Err(e) => {
                    debug!("Failed to check Claude CLI version: {}", e);
                    None
                }
            }
        })
        .await
        .clone()
}

/// Run `<command> --version` and extract the version number
pub async fn detect_version(command: &Path) -> Result<Option<String>> {
    let output = Command::new(command)
        .arg("--version")
        .output()
        .await
        .map_err(Error::Io)?;

    if !output.status.success() {
        debug!("Failed to check Claude CLI version - command failed");
        return Ok(None);
    }

    let version_str = String::from_utf8_lossy(&output.stdout);
    let parsed = parse_version_line(&version_str);
    if parsed.is_none() {
        warn!(
            "Could not parse Claude CLI version from output: '{}'",
            version_str.trim()
        );
    }
    Ok(parsed)
}

/// Extract the version from output such as `2.1.47 (Claude Code)`
pub fn parse_version_line(output: &str) -> Option<String> {
    let first = output.lines().next()?.split_whitespace().next()?;
    let looks_like_version = first.split('.').count() >= 2
        && first
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    looks_like_version.then(|| first.to_string())
}

fn warn_if_incompatible(version: &str) {
    match compatibility(version) {
        Compatibility::TooOld => warn!(
            "Claude CLI version {} is older than the minimum supported version {}",
            version, MINIMUM_VERSION
        ),
        Compatibility::NewerThanTested => warn!(
            "Claude CLI version {} is newer than tested version {}",
            version, TESTED_VERSION
        ),
        Compatibility::Supported => debug!(
            "Claude CLI version {} is compatible (tested: {})",
            version, TESTED_VERSION
        ),
    }
}

/// Compare two dotted version strings numerically
fn compare_versions(version: &str, other: &str) -> Ordering {
    let v_parts: Vec<u32> = version.split('.').filter_map(|s| s.parse().ok()).collect();
    let o_parts: Vec<u32> = other.split('.').filter_map(|s| s.parse().ok()).collect();

    for (v, o) in v_parts.iter().zip(o_parts.iter()) {
        match v.cmp(o) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    // If all compared parts are equal, longer version is newer
    v_parts.len().cmp(&o_parts.len())
}
