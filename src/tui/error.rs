use crate::api::ApiError;
use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Errors that can occur in the TUI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An I/O error occurred (terminal, event reading, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The car API could not be reached or answered with an error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The environment configuration was invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The log file could not be set up.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}
