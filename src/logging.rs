//! Tracing setup. The terminal belongs to the TUI, so events go to a file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "CARFORM_LOG";

/// Errors that can occur while installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not determine XDG data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A global subscriber was already installed.
    #[error("could not install log subscriber: {0}")]
    Subscriber(String),
}

/// Returns `<base>/carform/carform.log`.
pub fn log_file_path(base: &Path) -> PathBuf {
    base.join("carform").join("carform.log")
}

/// Installs a global fmt subscriber appending to the log file under the XDG
/// data directory. Filter comes from `CARFORM_LOG`, defaulting to `info`.
///
/// Returns the path of the log file.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn init() -> Result<PathBuf, LoggingError> {
    let data_dir = dirs::data_dir().ok_or(LoggingError::NoDataDir)?;
    let path = log_file_path(&data_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(path)
}
