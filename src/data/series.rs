//! Throughput-over-time series built from the response history.

use chrono::{Local, TimeZone};

use botwatch_types::HistoryEntry;

use super::format::format_time_label_in;

/// Maximum number of bots plotted on the line chart.
pub const TOP_SERIES: usize = 5;

/// One bot's throughput across the history window.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub bot_id: String,
    /// One point per history entry; `None` where the bot was absent.
    pub points: Vec<Option<f64>>,
}

impl LineSeries {
    /// Contiguous runs of present points as `(entry index, throughput)`.
    ///
    /// The chart draws each run as its own line so absences show as gaps.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for (i, point) in self.points.iter().enumerate() {
            match point {
                Some(value) => current.push((i as f64, *value)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Labels and series for the line chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineDataset {
    /// `HH:MM:SS` label per history entry.
    pub labels: Vec<String>,
    pub series: Vec<LineSeries>,
}

impl LineDataset {
    /// Number of history entries covered.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Largest plotted value, 0 when nothing is plotted.
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().flatten())
            .fold(0.0, |acc: f64, v| acc.max(*v))
    }
}

/// Build the line dataset with labels in the local time zone.
pub fn line_dataset(history: &[HistoryEntry]) -> LineDataset {
    line_dataset_in(history, &Local)
}

/// Build the line dataset with labels in the given time zone.
///
/// Series are the first [`TOP_SERIES`] bot ids in order of first appearance
/// across the history.
pub fn line_dataset_in<Tz>(history: &[HistoryEntry], tz: &Tz) -> LineDataset
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let labels = history
        .iter()
        .map(|entry| format_time_label_in(entry.timestamp, tz))
        .collect();

    let mut bot_ids: Vec<&str> = Vec::new();
    for entry in history {
        for row in &entry.stats {
            if bot_ids.len() == TOP_SERIES {
                break;
            }
            if let Some(id) = row.bot_id.as_deref() {
                if !bot_ids.contains(&id) {
                    bot_ids.push(id);
                }
            }
        }
    }

    let series = bot_ids
        .into_iter()
        .map(|id| LineSeries {
            bot_id: id.to_string(),
            points: history
                .iter()
                .map(|entry| {
                    entry
                        .stats
                        .iter()
                        .find(|row| row.bot_id.as_deref() == Some(id))
                        .map(|row| row.throughput_or_zero())
                })
                .collect(),
        })
        .collect();

    LineDataset { labels, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botwatch_types::StatsRow;
    use chrono::Utc;

    fn row(id: &str, throughput: f64) -> StatsRow {
        StatsRow {
            bot_id: Some(id.to_string()),
            throughput: Some(throughput),
            ..Default::default()
        }
    }

    fn entry(timestamp: f64, rows: Vec<StatsRow>) -> HistoryEntry {
        HistoryEntry {
            timestamp,
            stats: rows,
        }
    }

    #[test]
    fn test_empty_history() {
        let data = line_dataset_in(&[], &Utc);
        assert!(data.is_empty());
        assert!(data.series.is_empty());
        assert_eq!(data.max_value(), 0.0);
    }

    #[test]
    fn test_series_follow_first_appearance() {
        let history = vec![
            entry(1_700_000_000.0, vec![row("b", 2.0)]),
            entry(1_700_000_002.0, vec![row("a", 1.0), row("b", 3.0)]),
        ];
        let data = line_dataset_in(&history, &Utc);

        assert_eq!(data.labels, vec!["22:13:20", "22:13:22"]);
        let ids: Vec<_> = data.series.iter().map(|s| s.bot_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(data.series[0].points, vec![Some(2.0), Some(3.0)]);
        assert_eq!(data.series[1].points, vec![None, Some(1.0)]);
        assert_eq!(data.max_value(), 3.0);
    }

    #[test]
    fn test_at_most_five_series() {
        let rows = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|id| row(id, 1.0))
            .collect();
        let data = line_dataset_in(&[entry(0.0, rows)], &Utc);
        assert_eq!(data.series.len(), TOP_SERIES);
        assert_eq!(data.series[4].bot_id, "e");
    }

    #[test]
    fn test_missing_throughput_plots_zero() {
        let mut r = row("a", 0.0);
        r.throughput = None;
        let data = line_dataset_in(&[entry(0.0, vec![r])], &Utc);
        assert_eq!(data.series[0].points, vec![Some(0.0)]);
    }

    #[test]
    fn test_segments_split_on_gaps() {
        let series = LineSeries {
            bot_id: "a".to_string(),
            points: vec![Some(1.0), Some(2.0), None, None, Some(4.0)],
        };
        assert_eq!(
            series.segments(),
            vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(4.0, 4.0)]]
        );
    }
}
