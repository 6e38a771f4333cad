// 📝 Logging setup
// Interactive mode owns the terminal, so its logs go to a daily file.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

/// Log to `<log_dir>/meter.log.<date>`. Keep the guard alive until exit
/// or buffered lines are lost.
pub fn init_file_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "meter.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok(guard)
}

/// Log to stderr for batch commands.
pub fn init_console_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}
