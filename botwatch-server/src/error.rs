//! Error types for the collector.

use botwatch_types::DurationParseError;
use thiserror::Error;

/// Errors that can occur while configuring or running the collector.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// A configured value is out of range or malformed.
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// A configured duration could not be parsed.
    #[error(transparent)]
    Duration(#[from] DurationParseError),

    /// The listen address is not a valid socket address.
    #[error("Invalid listen address: {0}")]
    Address(String),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
