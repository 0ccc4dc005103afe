//! Channel-based data source.
//!
//! Receives stats responses via a tokio watch channel, for embedding the
//! dashboard next to something that already has the data in memory.

use botwatch_types::{AggregateBy, StatsResponse};
use tokio::sync::watch;

use super::DataSource;

/// A data source that receives stats responses via a channel.
///
/// The producer pushes responses through the channel. Aggregation requests
/// from the UI are recorded and can be read back with
/// [`ChannelSource::requested_aggregation`]; grouping is up to the producer.
///
/// # Example
///
/// ```
/// use botwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("in-process");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<StatsResponse>,
    description: String,
    initial_returned: bool,
    requested: AggregateBy,
}

impl ChannelSource {
    /// Create a new channel source.
    pub fn new(receiver: watch::Receiver<StatsResponse>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
            requested: AggregateBy::None,
        }
    }

    /// Create a channel pair. Returns `(sender, source)`.
    pub fn create(source_description: &str) -> (watch::Sender<StatsResponse>, Self) {
        let (tx, rx) = watch::channel(StatsResponse::default());
        (tx, Self::new(rx, source_description))
    }

    /// The aggregation mode most recently asked for by the UI.
    pub fn requested_aggregation(&self) -> AggregateBy {
        self.requested
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<StatsResponse> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn set_aggregation(&mut self, mode: AggregateBy) {
        self.requested = mode;
    }
}
