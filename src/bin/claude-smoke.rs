//! Smoke test binary for the Claude agent CLI
//!
//! Sends one fixed prompt and prints every streamed message. Agent failures
//! are reported on stdout and still exit with status 0.

use anyhow::{Context, Result};
use claude_smoke::{ClaudeAgent, Probe, ProbeConfig};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = ProbeConfig::from_env();
    info!(
        "Probing {} (model: {})",
        config.cli_path.display(),
        config.model.as_deref().unwrap_or("default")
    );

    let agent = ClaudeAgent::new(config.cli_builder()).check_version(config.check_version);
    let mut probe = Probe::new(config, std::io::stdout());
    let outcome = probe
        .run(&agent)
        .await
        .context("Failed to write probe report")?;

    info!("Probe finished: {:?}", outcome);
    Ok(())
}
