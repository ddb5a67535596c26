//! Error types for the rollcall CLI

use thiserror::Error;

/// Result type alias for rollcall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Errors from the remote attendance feed.
///
/// `AuthRequired` is terminal for the current pass and needs an external
/// re-login; `Timeout` and `FetchFailed` are retryable up to the
/// orchestrator's attempt limit.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required. Run `rollcall init` to log in again.")]
    AuthRequired,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed request failed: {0}")]
    FetchFailed(String),

    #[error("Invalid feed response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to feed".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Cache storage errors.
///
/// Only store setup surfaces as an error; per-key reads and writes degrade to
/// `None`/`false` so a bad cache file can never abort a pass.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Cache I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_required_message_points_to_init() {
        let err = ApiError::AuthRequired;
        assert!(err.to_string().contains("rollcall init"));
    }

    #[test]
    fn timeout_is_distinct_from_network() {
        assert!(ApiError::Timeout.to_string().contains("timed out"));
        assert!(
            ApiError::Network("Connection refused".to_string())
                .to_string()
                .contains("Connection refused")
        );
    }

    #[test]
    fn fetch_failed_carries_detail() {
        let err = ApiError::FetchFailed("empty data".to_string());
        assert!(err.to_string().contains("empty data"));
    }

    #[test]
    fn error_from_api_error() {
        let err: Error = ApiError::AuthRequired.into();
        match err {
            Error::Api(ApiError::AuthRequired) => (),
            _ => panic!("Expected Error::Api(ApiError::AuthRequired)"),
        }
    }

    #[test]
    fn config_error_from_yaml_error() {
        let yaml_err =
            serde_yaml::from_str::<serde_yaml::Value>("invalid: [yaml: content").unwrap_err();
        let config_err: ConfigError = yaml_err.into();
        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }

    #[test]
    fn cache_error_message() {
        let err = CacheError::Io("disk full".to_string());
        assert!(err.to_string().contains("disk full"));
    }
}
