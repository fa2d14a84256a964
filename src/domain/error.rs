//! Domain error types

use thiserror::Error;

/// Error when parsing a storage location URL
#[derive(Debug, Clone, Error)]
#[error("Malformed storage location \"{input}\": {reason}")]
pub struct MalformedLocationError {
    pub input: String,
    pub reason: String,
}

/// Error when parsing an interval string
#[derive(Debug, Clone, Error)]
#[error("Invalid interval format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 10s, 1m, 2m30s)")]
pub struct IntervalParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
