//! The `/api/stats` response document.

use serde::{Deserialize, Serialize};

use crate::StatsRow;

/// Totals across all active bots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalStats {
    pub bots: usize,
    pub received: u64,
    pub processed: u64,
    pub in_flight: u64,
    pub empty_polls: u64,
    pub partitions: u64,
    /// Longest elapsed time reported by any bot, in seconds.
    pub elapsed: f64,
    /// Sum of bot throughputs.
    pub throughput: f64,
    /// `processed / received` as a percentage.
    pub progress: f64,
}

/// A timestamped copy of the per-bot rows, recorded on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix time in seconds when the snapshot was recorded.
    pub timestamp: f64,
    #[serde(default)]
    pub stats: Vec<StatsRow>,
}

/// Everything the dashboard needs for one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Totals; `None` only when talking to a collector that omits them.
    #[serde(default)]
    pub global: Option<GlobalStats>,
    #[serde(default)]
    pub stats: Vec<StatsRow>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// The raw `aggregate_by` value the request carried.
    #[serde(default)]
    pub aggregated_by: Option<String>,
}

impl StatsResponse {
    /// Check if the response carries no rows.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.stats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_parses() {
        let response: StatsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.global.is_none());
        assert!(response.is_empty());
        assert!(response.history.is_empty());
        assert!(response.aggregated_by.is_none());
    }

    #[test]
    fn aggregated_by_serializes_as_null() {
        let response = StatsResponse {
            global: Some(GlobalStats::default()),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["aggregated_by"].is_null());
        assert_eq!(json["global"]["bots"], 0);
    }

    #[test]
    fn partial_global_defaults_to_zero() {
        let global: GlobalStats = serde_json::from_str(r#"{ "bots": 3 }"#).unwrap();
        assert_eq!(global.bots, 3);
        assert_eq!(global.throughput, 0.0);
    }

    #[test]
    fn history_round_trips_through_json() {
        let body = r#"{
            "global": { "bots": 1 },
            "stats": [],
            "history": [ { "timestamp": 5.5, "stats": [ { "bot_id": "a" } ] } ],
            "aggregated_by": "topic"
        }"#;
        let response: StatsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.history.len(), 1);
        assert_eq!(response.history[0].timestamp, 5.5);
        assert_eq!(response.aggregated_by.as_deref(), Some("topic"));
    }
}
