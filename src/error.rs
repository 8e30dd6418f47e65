//! Error types for the harness.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Setting {key} is not set. Please set it before running the tests.")]
    Config { key: String },

    #[error("Setting {key} has an invalid value {value:?}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Environment file is not present at: {}", .0.display())]
    EnvFileMissing(PathBuf),

    #[error("Failed to get token: {0}")]
    Auth(String),

    #[error("Failed to retrieve bearer token after {attempts} attempts. Last error: {last}")]
    AuthExhausted {
        attempts: u32,
        #[source]
        last: Box<HarnessError>,
    },

    #[error("Failed to persist session state at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Request failed with status {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Timed out after {timeout_ms} ms waiting for {locator} to be {state}")]
    InteractionTimeout {
        locator: String,
        state: String,
        timeout_ms: u64,
    },

    #[error("Login failed after {attempts} attempts. Last error: {last}")]
    LoginExhausted {
        attempts: u32,
        #[source]
        last: Box<HarnessError>,
    },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub fn config(key: impl Into<String>) -> Self {
        HarnessError::Config { key: key.into() }
    }

    /// True for element waits that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::InteractionTimeout { .. })
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
