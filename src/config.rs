//! Runtime configuration read from `CARFORM_*` environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::form::SubmitPolicy;

fn def_api_url() -> String {
    String::from("http://localhost:8000/api")
}

fn def_request_timeout_secs() -> u64 {
    10
}

fn def_true() -> bool {
    true
}

/// Errors raised while loading [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed into its expected type.
    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the car API; the collection lives at `{api_url}/car`.
    #[serde(default = "def_api_url")]
    pub api_url: String,

    #[serde(default = "def_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub reset_on_invalid: bool,

    #[serde(default = "def_true")]
    pub reset_on_success: bool,

    #[serde(default)]
    pub reset_on_failure: bool,

    #[serde(default = "def_true")]
    pub close_on_success: bool,
}

impl AppConfig {
    /// Loads the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Loads the config from `CARFORM_`-prefixed key/value pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: AppConfig = envy::prefixed("CARFORM_").from_iter(vars)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The reset/close policy the dialog should follow.
    pub fn submit_policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            reset_on_invalid: self.reset_on_invalid,
            reset_on_success: self.reset_on_success,
            reset_on_failure: self.reset_on_failure,
            close_on_success: self.close_on_success,
        }
    }
}
