/// Errors returned by a [`CarApi`](super::CarApi) call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The request never completed (connection refused, timeout, ...).
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The configured base URL cannot have paths appended to it.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// The response body was not a car record.
    #[error("decode: {0}")]
    Decode(String),
}
