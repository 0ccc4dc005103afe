//! Prometheus exposition format support.
//!
//! `GET /metrics` renders the same totals the dashboard shows, plus a few
//! per-bot gauges, so the collector can also be scraped by Prometheus.

use botwatch_types::{GlobalStats, StatsRow};

/// Totals exported as `botwatch_<name>`: (name, help, type).
///
/// The `_total` families sum over active bots only, so they fall when a bot
/// times out and are exposed as gauges.
const GLOBAL_FAMILIES: &[(&str, &str, &str)] = &[
    ("active_bots", "Number of bots that reported recently", "gauge"),
    ("received_total", "Messages received across active bots", "gauge"),
    ("processed_total", "Messages processed across active bots", "gauge"),
    ("in_flight", "Messages currently in flight", "gauge"),
    ("empty_polls_total", "Polls that returned no messages", "gauge"),
    ("partitions", "Partitions assigned across active bots", "gauge"),
    ("elapsed_seconds", "Longest elapsed time reported by any bot", "gauge"),
    ("throughput", "Combined throughput of active bots", "gauge"),
    ("progress_percent", "Processed messages as a percentage of received", "gauge"),
];

/// Format totals and per-bot rows as Prometheus exposition format.
pub fn format_prometheus(global: &GlobalStats, rows: &[StatsRow]) -> String {
    let mut output = String::new();

    let values = [
        global.bots as f64,
        global.received as f64,
        global.processed as f64,
        global.in_flight as f64,
        global.empty_polls as f64,
        global.partitions as f64,
        global.elapsed,
        global.throughput,
        global.progress,
    ];

    for ((name, help, kind), value) in GLOBAL_FAMILIES.iter().zip(values) {
        output.push_str(&format!("# HELP botwatch_{} {}\n", name, help));
        output.push_str(&format!("# TYPE botwatch_{} {}\n", name, kind));
        output.push_str(&format!("botwatch_{} {}\n", name, value));
    }

    output.push_str("# HELP botwatch_bot_throughput Throughput reported by a single bot\n");
    output.push_str("# TYPE botwatch_bot_throughput gauge\n");
    for row in rows {
        let Some(bot_id) = row.bot_id.as_deref() else {
            continue;
        };
        if let Some(throughput) = row.throughput {
            output.push_str(&format!(
                "botwatch_bot_throughput{{bot_id=\"{}\"}} {:.2}\n",
                escape_label_value(bot_id),
                throughput
            ));
        }
    }

    output.push_str("# HELP botwatch_bot_in_flight Messages in flight for a single bot\n");
    output.push_str("# TYPE botwatch_bot_in_flight gauge\n");
    for row in rows {
        let (Some(bot_id), Some(in_flight)) = (row.bot_id.as_deref(), row.in_flight) else {
            continue;
        };
        output.push_str(&format!(
            "botwatch_bot_in_flight{{bot_id=\"{}\"}} {}\n",
            escape_label_value(bot_id),
            in_flight
        ));
    }

    output
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
