use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sends tracing output to `log_file`. The TUI owns the terminal, so without
/// a file nothing is logged at all.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(log_path) = log_file else {
        return Ok(());
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
