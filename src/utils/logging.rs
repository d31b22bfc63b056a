//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to the directory named by
//! `WINDISPLAY_LOG_DIR` (falling back to the system temp directory) and
//! automatic rotation on startup keeping 10 historical files.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (windisplay.log.1 through .9)
const MAX_LOG_FILES: u8 = 9;

/// Resolve the log directory
fn log_dir() -> PathBuf {
    std::env::var_os("WINDISPLAY_LOG_DIR")
        .map_or_else(|| std::env::temp_dir().join("windisplay"), PathBuf::from)
}

/// Initialize the logging system
///
/// Log level defaults to INFO but can be configured via the `RUST_LOG`
/// environment variable. Rotates existing logs on startup to maintain a
/// history of the last 10 sessions.
pub fn init_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    // Rotate existing log files on startup
    let log_path = log_dir.join("windisplay.log");
    rotate_logs_on_startup(&log_path)?;

    // tracing_appender's RollingFileAppender doesn't support startup-based
    // rotation with this retention policy, so rotation is handled above
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("windisplay")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| crate::error::WinDisplayError::StoreUnavailable(e.to_string()))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false) // Disable ANSI colors for file output
        .with_target(true) // Include target module
        .with_thread_ids(true) // Include thread IDs
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| crate::error::WinDisplayError::StoreUnavailable(e.to_string()))?;

    tracing::info!("windisplay v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Rotate log files on startup
///
/// - windisplay.log.9 is deleted (oldest log)
/// - windisplay.log.8 -> windisplay.log.9, and so on down to .1
/// - windisplay.log -> windisplay.log.1
/// - A fresh windisplay.log will be created by the logger
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path.parent().ok_or_else(|| {
        crate::error::WinDisplayError::StoreUnavailable("invalid log path".to_string())
    })?;
    let log_name = log_path
        .file_name()
        .ok_or_else(|| {
            crate::error::WinDisplayError::StoreUnavailable("invalid log filename".to_string())
        })?
        .to_string_lossy();

    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        let next_log = log_dir.join(format!("{log_name}.{}", i + 1));
        if current_log.exists() {
            std::fs::rename(&current_log, &next_log)?;
        }
    }

    let log_1 = log_dir.join(format!("{log_name}.1"));
    std::fs::rename(log_path, &log_1)?;

    Ok(())
}
