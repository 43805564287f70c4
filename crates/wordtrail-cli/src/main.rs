//! Wordtrail command harness entry point.

use std::error::Error;
use std::io;

use tracing_subscriber::EnvFilter;
use wordtrail_cli::config::CliConfig;
use wordtrail_cli::runner;
use wordtrail_cli::state::AppState;

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout carries responses.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .json()
        .init();

    let config = CliConfig::from_env()?;
    tracing::info!(
        save_dir = %config.save_dir.display(),
        content_dir = %config.content_dir.display(),
        "Starting Wordtrail session"
    );

    let mut app = AppState::from_config(&config);
    runner::run(&mut app, io::stdin().lock(), io::stdout().lock())?;

    if let Err(err) = app.controller.flush() {
        tracing::warn!(error = %err, "final flush failed");
    }
    tracing::info!("Session ended");
    Ok(())
}
