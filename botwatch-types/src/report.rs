//! Reports pushed by bots to `POST /update`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single bot's self-reported counters.
///
/// All listed fields are required. Anything else the bot sends (topic,
/// group id, error counts, ...) is kept in [`BotReport::extra`] and passed
/// through to the dashboard untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotReport {
    pub bot_id: String,
    pub received: u64,
    pub processed: u64,
    pub in_flight: u64,
    pub throughput: f64,
    pub elapsed: f64,
    pub empty_polls: u64,
    pub partitions: u64,
    pub progress: f64,
    /// Unix time in seconds at which the bot produced this report.
    pub timestamp: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BotReport {
    /// Create a report with zeroed counters.
    pub fn new(bot_id: impl Into<String>, timestamp: f64) -> Self {
        Self {
            bot_id: bot_id.into(),
            received: 0,
            processed: 0,
            in_flight: 0,
            throughput: 0.0,
            elapsed: 0.0,
            empty_polls: 0,
            partitions: 0,
            progress: 0.0,
            timestamp,
            extra: Map::new(),
        }
    }

    /// Set an extra (pass-through) field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
