//! Unified error types for sensorwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error while reading the telemetry feed
    #[error("Telemetry error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Error from a notification channel
    #[error("Notification error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Error from the poll scheduler lifecycle
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the telemetry fetcher
///
/// All variants are transient from the scheduler's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, DNS failure, refused connection
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The feed service answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {message}")]
    UpstreamError { status: u16, message: String },

    /// Body is empty or does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Short machine-friendly kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkFailure(_) => "network_failure",
            Self::UpstreamError { .. } => "upstream_error",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::UpstreamError {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        if err.is_decode() {
            return FetchError::MalformedResponse(err.to_string());
        }
        if err.is_timeout() {
            return FetchError::NetworkFailure("request timed out".to_string());
        }
        FetchError::NetworkFailure(err.to_string())
    }
}

/// Errors from notification dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The notification surface rejected or failed the notification
    #[error("Dispatch via {notifier} failed: {message}")]
    DispatchFailure { notifier: String, message: String },

    /// No async runtime is available to run the dispatch on
    #[error("No async runtime available for {0}")]
    RuntimeUnavailable(String),
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The feed channel id is empty
    #[error("Channel id must not be empty")]
    EmptyChannelId,

    /// The feed base URL cannot be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Threshold is NaN or infinite
    #[error("Invalid threshold for channel '{channel}': {value}")]
    InvalidThreshold { channel: String, value: f64 },

    /// Poll interval is zero or above the configured maximum
    #[error("Poll interval must be between 1 and 86400 seconds")]
    InvalidInterval,

    /// History capacity is zero or above the configured maximum
    #[error("History capacity must be between 1 and 10000")]
    InvalidCapacity,
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors from the poll scheduler lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// `start` called while running
    #[error("Scheduler is already running")]
    AlreadyRunning,

    /// `stop` called while stopped
    #[error("Scheduler is not running")]
    NotRunning,

    /// The polling task panicked or was aborted
    #[error("Polling task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
