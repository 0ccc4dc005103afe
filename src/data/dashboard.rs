//! Display-ready view of a stats response.

use std::time::Instant;

use anyhow::Result;
use botwatch_types::{AggregateBy, GlobalStats, StatsResponse, StatsRow};

use super::format::{
    format_count, format_elapsed, format_progress, format_text, format_throughput, PLACEHOLDER,
};
use super::series::{line_dataset, LineDataset};

/// Column headers of the per-bot table.
pub const TABLE_HEADERS: [&str; 12] = [
    "Bot",
    "IP",
    "Topic",
    "Group",
    "Received",
    "Processed",
    "In flight",
    "Empty polls",
    "Partitions",
    "Throughput",
    "Elapsed",
    "Progress",
];

/// One labelled value in the summary bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

/// A formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Cells in [`TABLE_HEADERS`] order.
    pub cells: Vec<String>,
}

impl TableRow {
    /// The bot column, used for filtering.
    pub fn bot(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or(PLACEHOLDER)
    }
}

/// One bar of the throughput chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarItem {
    pub label: String,
    pub value: f64,
}

/// Summary bar contents, in display order.
pub fn summary_items(global: Option<&GlobalStats>) -> Vec<SummaryItem> {
    let item = |label, value| SummaryItem { label, value };

    vec![
        item("Bots", format_count(global.map(|g| g.bots as u64))),
        item("Received", format_count(global.map(|g| g.received))),
        item("Processed", format_count(global.map(|g| g.processed))),
        item("In flight", format_count(global.map(|g| g.in_flight))),
        item("Empty polls", format_count(global.map(|g| g.empty_polls))),
        item("Partitions", format_count(global.map(|g| g.partitions))),
        item("Elapsed", format_elapsed(global.map(|g| g.elapsed))),
        item("Throughput", format_throughput(global.map(|g| g.throughput))),
        item("Progress", format_progress(global.map(|g| g.progress))),
    ]
}

/// Format one stats row for the table.
pub fn table_row(row: &StatsRow) -> TableRow {
    TableRow {
        cells: vec![
            format_text(row.bot_id.as_deref()),
            format_text(row.ip_address.as_deref()),
            format_text(row.text("topic").as_deref()),
            format_text(row.text("group_id").as_deref()),
            format_count(row.received),
            format_count(row.processed),
            format_count(row.in_flight),
            format_count(row.empty_polls),
            format_count(row.partitions),
            format_throughput(row.throughput),
            format_elapsed(row.elapsed),
            format_progress(row.progress),
        ],
    }
}

/// Format every stats row, keeping response order.
pub fn table_rows(stats: &[StatsRow]) -> Vec<TableRow> {
    stats.iter().map(table_row).collect()
}

/// Throughput per bot, in response order.
pub fn bar_dataset(stats: &[StatsRow]) -> Vec<BarItem> {
    stats
        .iter()
        .map(|row| BarItem {
            label: format_text(row.bot_id.as_deref()),
            value: row.throughput_or_zero(),
        })
        .collect()
}

/// Everything the UI draws for one response.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub summary: Vec<SummaryItem>,
    pub rows: Vec<TableRow>,
    pub bars: Vec<BarItem>,
    pub lines: LineDataset,
    /// Grouping the collector applied to `rows`.
    pub aggregated_by: AggregateBy,
    pub response: StatsResponse,
    pub last_updated: Instant,
}

impl Dashboard {
    /// Parse a response from a JSON string.
    pub fn parse(content: &str) -> Result<Self> {
        let response: StatsResponse = serde_json::from_str(content)?;
        Ok(Self::from_response(response))
    }

    /// Build the view from a response. Used by all data sources.
    pub fn from_response(response: StatsResponse) -> Self {
        let aggregated_by = response
            .aggregated_by
            .as_deref()
            .map(AggregateBy::parse)
            .unwrap_or_default();

        Self {
            summary: summary_items(response.global.as_ref()),
            rows: table_rows(&response.stats),
            bars: bar_dataset(&response.stats),
            lines: line_dataset(&response.history),
            aggregated_by,
            response,
            last_updated: Instant::now(),
        }
    }

    /// Indices of rows whose bot column contains `filter` (case-insensitive).
    pub fn filtered_indices(&self, filter: &str) -> Vec<usize> {
        let needle = filter.to_lowercase();
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| needle.is_empty() || row.bot().to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> &'static str {
        r#"{
            "global": {
                "bots": 2, "received": 300, "processed": 150, "in_flight": 4,
                "empty_polls": 1, "partitions": 6, "elapsed": 42.24,
                "throughput": 9.5, "progress": 50.0
            },
            "stats": [
                { "bot_id": "bot-b", "ip_address": "10.0.0.2", "received": 200,
                  "processed": 100, "in_flight": 3, "throughput": 7.0, "elapsed": 42.24,
                  "empty_polls": 1, "partitions": 4, "progress": 50.0,
                  "timestamp": 1700000000.0, "topic": "orders", "group_id": "g1" },
                { "bot_id": "bot-a", "received": 100, "throughput": 2.5 }
            ],
            "history": [
                { "timestamp": 1700000000.0,
                  "stats": [ { "bot_id": "bot-b", "throughput": 7.0 } ] }
            ],
            "aggregated_by": null
        }"#
    }

    #[test]
    fn test_parse_builds_all_views() {
        let dashboard = Dashboard::parse(sample_json()).unwrap();

        assert_eq!(dashboard.summary.len(), 9);
        assert_eq!(dashboard.rows.len(), 2);
        assert_eq!(dashboard.bars.len(), 2);
        assert_eq!(dashboard.lines.len(), 1);
        assert_eq!(dashboard.lines.series[0].bot_id, "bot-b");
        assert_eq!(dashboard.aggregated_by, AggregateBy::None);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(Dashboard::parse("not json").is_err());
    }

    #[test]
    fn test_summary_items() {
        let dashboard = Dashboard::parse(sample_json()).unwrap();
        let pairs: Vec<(&str, &str)> = dashboard
            .summary
            .iter()
            .map(|i| (i.label, i.value.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("Bots", "2"),
                ("Received", "300"),
                ("Processed", "150"),
                ("In flight", "4"),
                ("Empty polls", "1"),
                ("Partitions", "6"),
                ("Elapsed", "42.2s"),
                ("Throughput", "9.50"),
                ("Progress", "50.0%"),
            ]
        );
    }

    #[test]
    fn test_summary_without_global_is_placeholders() {
        let items = summary_items(None);
        assert_eq!(items.len(), 9);
        assert!(items.iter().all(|i| i.value == "-"));
    }

    #[test]
    fn test_table_rows_with_placeholders() {
        let dashboard = Dashboard::parse(sample_json()).unwrap();

        assert_eq!(
            dashboard.rows[0].cells,
            vec![
                "bot-b", "10.0.0.2", "orders", "g1", "200", "100", "3", "1", "4", "7.00", "42.2s",
                "50.0%"
            ]
        );
        assert_eq!(
            dashboard.rows[1].cells,
            vec!["bot-a", "-", "-", "-", "100", "-", "-", "-", "-", "2.50", "-", "-"]
        );
        assert_eq!(dashboard.rows[0].cells.len(), TABLE_HEADERS.len());
    }

    #[test]
    fn test_table_row_renders_numeric_extras() {
        let row: StatsRow =
            serde_json::from_value(json!({ "bot_id": "x", "group_id": 7, "topic": null })).unwrap();
        let cells = table_row(&row).cells;
        assert_eq!(cells[2], "-");
        assert_eq!(cells[3], "7");
    }

    #[test]
    fn test_bar_dataset() {
        let mut rows = vec![StatsRow {
            bot_id: Some("a".to_string()),
            throughput: Some(3.5),
            ..Default::default()
        }];
        rows.push(StatsRow::default());

        let bars = bar_dataset(&rows);
        assert_eq!(
            bars,
            vec![
                BarItem {
                    label: "a".to_string(),
                    value: 3.5
                },
                BarItem {
                    label: "-".to_string(),
                    value: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_aggregated_by_is_parsed() {
        let response = StatsResponse {
            aggregated_by: Some("topic".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Dashboard::from_response(response).aggregated_by,
            AggregateBy::Topic
        );
    }

    #[test]
    fn test_filtered_indices() {
        let dashboard = Dashboard::parse(sample_json()).unwrap();
        assert_eq!(dashboard.filtered_indices(""), vec![0, 1]);
        assert_eq!(dashboard.filtered_indices("BOT-A"), vec![1]);
        assert!(dashboard.filtered_indices("zzz").is_empty());
    }
}
