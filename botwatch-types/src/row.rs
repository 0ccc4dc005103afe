//! Rows of the `stats` array (and of each history entry).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BotReport;

/// One row of stats: either a single bot or an aggregated group of bots.
///
/// Every field is optional. Group rows do not carry `elapsed` or
/// `progress`, and older collectors may omit others, so consumers should
/// treat a missing value as "unknown" rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_polls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Address the report arrived from, filled in by the collector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Number of bots folded into this row (group rows only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots_count: Option<usize>,
    /// Ids of the bots folded into this row (group rows only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots: Option<Vec<String>>,
    /// Pass-through fields (topic, group_id, erred, queue_size, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatsRow {
    /// Build a row from a validated report and the address it came from.
    pub fn from_report(report: BotReport, ip_address: Option<String>) -> Self {
        let BotReport {
            bot_id,
            received,
            processed,
            in_flight,
            throughput,
            elapsed,
            empty_polls,
            partitions,
            progress,
            timestamp,
            mut extra,
        } = report;

        // The collector owns these; a bot cannot spoof them.
        for key in ["ip_address", "bots", "bots_count"] {
            extra.remove(key);
        }

        Self {
            bot_id: Some(bot_id),
            received: Some(received),
            processed: Some(processed),
            in_flight: Some(in_flight),
            throughput: Some(throughput),
            elapsed: Some(elapsed),
            empty_polls: Some(empty_polls),
            partitions: Some(partitions),
            progress: Some(progress),
            timestamp: Some(timestamp),
            ip_address,
            bots_count: None,
            bots: None,
            extra,
        }
    }

    /// Look up any field by its wire name.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "bot_id" => self.bot_id.clone().map(Value::from),
            "received" => self.received.map(Value::from),
            "processed" => self.processed.map(Value::from),
            "in_flight" => self.in_flight.map(Value::from),
            "throughput" => self.throughput.map(Value::from),
            "elapsed" => self.elapsed.map(Value::from),
            "empty_polls" => self.empty_polls.map(Value::from),
            "partitions" => self.partitions.map(Value::from),
            "progress" => self.progress.map(Value::from),
            "timestamp" => self.timestamp.map(Value::from),
            "ip_address" => self.ip_address.clone().map(Value::from),
            "bots_count" => self.bots_count.map(Value::from),
            "bots" => self.bots.clone().map(Value::from),
            other => self.extra.get(other).filter(|v| !v.is_null()).cloned(),
        }
    }

    /// A field rendered as display text: strings verbatim, anything else as
    /// its JSON representation.
    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name).map(|value| value_text(&value))
    }

    /// Throughput, treating a missing value as zero (for sorting and sums).
    pub fn throughput_or_zero(&self) -> f64 {
        self.throughput.unwrap_or(0.0)
    }

    /// Report time, treating a missing value as the epoch.
    pub fn timestamp_or_zero(&self) -> f64 {
        self.timestamp.unwrap_or(0.0)
    }
}

/// Render a JSON value as display text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> BotReport {
        let mut report = BotReport::new("b1", 100.0)
            .with_extra("topic", "orders")
            .with_extra("group_id", 7)
            .with_extra("ip_address", "6.6.6.6");
        report.received = 10;
        report.throughput = 2.5;
        report
    }

    #[test]
    fn from_report_sets_collector_fields() {
        let row = StatsRow::from_report(report(), Some("10.0.0.1".to_string()));
        assert_eq!(row.bot_id.as_deref(), Some("b1"));
        assert_eq!(row.received, Some(10));
        assert_eq!(row.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(!row.extra.contains_key("ip_address"));
    }

    #[test]
    fn field_lookup_covers_typed_and_extra() {
        let row = StatsRow::from_report(report(), Some("10.0.0.1".to_string()));
        assert_eq!(row.text("ip_address").as_deref(), Some("10.0.0.1"));
        assert_eq!(row.text("topic").as_deref(), Some("orders"));
        assert_eq!(row.text("group_id").as_deref(), Some("7"));
        assert_eq!(row.text("register_at"), None);
    }

    #[test]
    fn missing_fields_are_omitted_when_serialized() {
        let row = StatsRow {
            bot_id: Some("g (2 bots)".to_string()),
            throughput: Some(1.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&row).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(!obj.contains_key("elapsed"));
    }

    #[test]
    fn lenient_parse_of_partial_row() {
        let row: StatsRow =
            serde_json::from_str(r#"{ "bot_id": "x", "queue_size": 4 }"#).unwrap();
        assert_eq!(row.bot_id.as_deref(), Some("x"));
        assert_eq!(row.progress, None);
        assert_eq!(row.field("queue_size"), Some(Value::from(4)));
        assert_eq!(row.throughput_or_zero(), 0.0);
    }
}
