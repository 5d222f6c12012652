//! File logging setup.
//!
//! The terminal belongs to the user interface, so log records go to a file instead of stderr.

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr as _};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

/// Name of the log file inside the log directory.
pub const LOG_FILE: &str = "mazechase.log";

/// Installs the global subscriber writing to `<dir>/mazechase.log`.
///
/// The level defaults to `info` and can be changed through `RUST_LOG`. Records are flushed by a
/// background worker that stops when the returned guard is dropped, so the guard has to outlive the
/// game.
///
/// # Errors
///
/// This function may return errors if:
/// - The log directory cannot be created
/// - A global subscriber is already installed
pub fn init(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .wrap_err("failed to install the log subscriber")?;

    tracing::info!(file = %dir.join(LOG_FILE).display(), "logging initialised");

    Ok(guard)
}
