//! Core error types for taskline-core.
//!
//! Fatal errors (transport, parse, schedule load, configuration, validation)
//! roll up into [`CoreError`]. Desktop errors ([`NotificationError`],
//! [`AudioError`]) are recoverable: the timer loop logs and drops them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The external model could not be reached or refused the request
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The model answered with something that is not a schedule
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The schedule artifact could not be loaded
    #[error("Schedule load error: {0}")]
    ScheduleLoad(#[from] ScheduleLoadError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures calling the LLM endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request never produced an HTTP response
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 401 / 403
    #[error("unauthorized (HTTP {status}): check the API key")]
    Unauthorized { status: u16 },

    /// Any other non-success status
    #[error("LLM API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// Response decoded but carried no message content
    #[error("LLM response contained no message content")]
    EmptyResponse,

    /// Endpoint URL could not be built
    #[error("invalid endpoint URL '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },
}

/// The model's answer could not be turned into a schedule.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Not JSON at all, or JSON of the wrong shape
    #[error("response is not a valid schedule: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    /// Response was empty after trimming
    #[error("response was empty")]
    Empty,
}

/// The schedule artifact at timer start is missing or malformed.
#[derive(Error, Debug)]
pub enum ScheduleLoadError {
    #[error("schedule file '{path}' was not found")]
    NotFound { path: PathBuf },

    #[error("failed to read schedule file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schedule file '{path}' is not a valid schedule: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Strict mode rejected a generated schedule
    #[error("schedule has {} issue(s): {}", .0.len(), .0.join("; "))]
    ScheduleRejected(Vec<String>),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// A notification daemon call failed. Never fatal.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("notification daemon rejected '{title}': {message}")]
    Show { title: String, message: String },

    #[error("failed to close notifications: {0}")]
    Close(String),

    #[error("notification service unavailable: {0}")]
    Unavailable(String),
}

/// The alarm sound could not be played. Never fatal.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio player available")]
    NoPlayer,

    #[error("alarm sound '{path}' does not exist")]
    MissingSound { path: PathBuf },

    #[error("failed to spawn '{player}': {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
