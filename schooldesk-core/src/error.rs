//! Error types for the schooldesk core.

use thiserror::Error;

/// Errors raised while expanding or grouping schedule records.
///
/// These indicate bad data coming from the API and are always propagated to
/// the caller, never replaced by a default value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid {what} format: '{value}'")]
    InvalidFormat { what: &'static str, value: String },

    #[error("Malformed schedule input: {0}")]
    MalformedInput(String),
}

impl ScheduleError {
    pub(crate) fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        ScheduleError::InvalidFormat {
            what,
            value: value.into(),
        }
    }
}

/// Result type alias for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors raised while decoding a bearer token's payload.
///
/// The session manager treats every one of these as "expired".
#[derive(Error, Debug)]
pub enum TokenDecodeError {
    #[error("Token must have 3 dot-separated segments, found {0}")]
    Segments(usize),

    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON claims: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid duration for {key}: {message}")]
    Duration { key: &'static str, message: String },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
