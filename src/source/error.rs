//! Errors raised while fetching stats.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when fetching stats from the collector.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed or the collector answered with a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A saved response could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Could not connect to the collector.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("Request timed out")]
    Timeout,

    /// The poll interval was zero.
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}
