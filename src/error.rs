use crate::core::WindowId;
use thiserror::Error;

/// Errors raised by the data layer and services.
#[derive(Debug, Error)]
pub enum OptixError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("no window with id {0}")]
    UnknownWindow(WindowId),

    #[error("CSV has no header row")]
    MissingHeader,
}

/// Failures talking to the analysis backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend URL '{0}'")]
    InvalidUrl(String),
}

pub type Result<T, E = OptixError> = std::result::Result<T, E>;
