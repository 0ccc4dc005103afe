//! Data source abstraction for receiving stats.
//!
//! The dashboard reads [`StatsResponse`] values from a source. The usual
//! source polls a running collector over HTTP; a saved response or an
//! in-process channel work too.

mod channel;
mod error;
mod file;
mod http;

pub use channel::ChannelSource;
pub use error::SourceError;
pub use file::{read_response, FileSource};
pub use http::{build_client, fetch_stats, HttpSource, HttpSourceConfig, DEFAULT_BASE_URL};

use std::fmt::Debug;

use botwatch_types::{AggregateBy, StatsResponse};

/// Trait for receiving stats from various sources.
///
/// # Example
///
/// ```
/// use botwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("stats.json");
/// if let Some(response) = source.poll() {
///     println!("Got {} rows", response.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest response.
    ///
    /// Returns `Some(response)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<StatsResponse>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message from the most recent failed fetch, if any.
    fn error(&self) -> Option<&str>;

    /// Ask the source to group rows by the given field.
    ///
    /// Sources that cannot aggregate ignore this.
    fn set_aggregation(&mut self, _mode: AggregateBy) {}

    /// Ask the source to fetch again as soon as possible.
    fn refresh(&mut self) {}
}
