//! Headless arena battle runner.
//!
//! Loads a data directory (battle config, unit/skill/effect catalog and a
//! scenario), plays the match to the end and prints a short report. All
//! tracing output goes to a per-session log file.
//!
//! ```bash
//! ARENA_CONTENT_DIR=data ARENA_SCENARIO=skirmish cargo run -p battle-cli
//! ```
mod config;
mod logging;
mod session;

use anyhow::Result;
use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let log_file = logging::setup_logging(config.session_id.as_deref())?;
    tracing::info!(?config, "Starting arena");

    let report = session::run_match(&config).await?;
    report.print(&log_file);

    tracing::info!("Arena shutdown complete");
    Ok(())
}
