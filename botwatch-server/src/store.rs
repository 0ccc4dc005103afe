//! In-memory storage of the latest report per bot plus a bounded history.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use botwatch_types::{AggregateBy, BotReport, GlobalStats, HistoryEntry, StatsResponse, StatsRow};
use parking_lot::{Mutex, RwLock};

use crate::aggregate::{aggregate_rows, sort_by_throughput};
use crate::ServerConfig;

/// Current Unix time in fractional seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Thread-safe store shared by all connections.
#[derive(Debug)]
pub struct StatsStore {
    bots: RwLock<BTreeMap<String, StatsRow>>,
    history: Mutex<VecDeque<HistoryEntry>>,
    max_history_entries: usize,
    active_timeout: Duration,
}

impl StatsStore {
    /// Create an empty store.
    pub fn new(max_history_entries: usize, active_timeout: Duration) -> Self {
        Self {
            bots: RwLock::new(BTreeMap::new()),
            history: Mutex::new(VecDeque::new()),
            max_history_entries: max_history_entries.max(1),
            active_timeout,
        }
    }

    /// Create a store sized by the collector configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.max_history_entries, config.active_timeout)
    }

    /// Record a bot's latest report, replacing any earlier one.
    pub fn update(&self, report: BotReport, ip_address: Option<String>) {
        let bot_id = report.bot_id.clone();
        let row = StatsRow::from_report(report, ip_address);
        self.bots.write().insert(bot_id, row);
    }

    /// Number of bots that have ever reported.
    pub fn len(&self) -> usize {
        self.bots.read().len()
    }

    /// Check if no bot has reported yet.
    pub fn is_empty(&self) -> bool {
        self.bots.read().is_empty()
    }

    /// Number of history entries currently retained.
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Rows for bots whose last report is at most `active_timeout` old.
    pub fn active_bots(&self, now: f64) -> Vec<StatsRow> {
        let timeout = self.active_timeout.as_secs_f64();
        self.bots
            .read()
            .values()
            .filter(|row| now - row.timestamp_or_zero() <= timeout)
            .cloned()
            .collect()
    }

    /// Active rows sorted by throughput, with totals. Does not touch history.
    ///
    /// Rows are read in bot id order before the stable sort, so bots with
    /// equal throughput are listed by id rather than by when they first
    /// reported.
    pub fn current(&self, now: f64) -> (GlobalStats, Vec<StatsRow>) {
        let mut rows = self.active_bots(now);
        let global = compute_global(&rows);
        sort_by_throughput(&mut rows);
        (global, rows)
    }

    /// Build the `/api/stats` response and record a history snapshot.
    ///
    /// `aggregate_by` is the raw query value; only the three grouping
    /// fields aggregate, but the value is echoed back unchanged.
    pub fn snapshot_at(&self, aggregate_by: Option<&str>, now: f64) -> StatsResponse {
        let (global, rows) = self.current(now);

        let mode = aggregate_by.map(AggregateBy::parse).unwrap_or_default();
        let stats = match mode.field() {
            Some(field) => {
                let mut groups = aggregate_rows(&rows, field);
                sort_by_throughput(&mut groups);
                groups
            }
            None => rows.clone(),
        };

        let history = self.record_history(rows, now);

        StatsResponse {
            global: Some(global),
            stats,
            history,
            aggregated_by: aggregate_by.map(str::to_string),
        }
    }

    /// [`StatsStore::snapshot_at`] using the current wall clock.
    pub fn snapshot(&self, aggregate_by: Option<&str>) -> StatsResponse {
        self.snapshot_at(aggregate_by, unix_now())
    }

    /// Drop departed bots from existing entries, append a new entry and
    /// trim to the cap. Returns a copy of the resulting history.
    fn record_history(&self, rows: Vec<StatsRow>, now: f64) -> Vec<HistoryEntry> {
        let active: HashSet<String> = rows.iter().filter_map(|r| r.bot_id.clone()).collect();

        let mut history = self.history.lock();
        for entry in history.iter_mut() {
            entry
                .stats
                .retain(|row| row.bot_id.as_ref().is_some_and(|id| active.contains(id)));
        }

        history.push_back(HistoryEntry {
            timestamp: now,
            stats: rows,
        });
        while history.len() > self.max_history_entries {
            history.pop_front();
        }

        history.iter().cloned().collect()
    }
}

/// Totals across the given rows.
pub fn compute_global(rows: &[StatsRow]) -> GlobalStats {
    if rows.is_empty() {
        return GlobalStats::default();
    }

    let received = sum_counter(rows, |r| r.received);
    let processed = sum_counter(rows, |r| r.processed);
    let elapsed = rows
        .iter()
        .filter_map(|r| r.elapsed)
        .fold(0.0_f64, f64::max);
    let throughput: f64 = rows
        .iter()
        .map(StatsRow::throughput_or_zero)
        .filter(|t| *t != 0.0)
        .sum();
    let progress = if received > 0 {
        processed as f64 / received as f64 * 100.0
    } else {
        0.0
    };

    GlobalStats {
        bots: rows.len(),
        received,
        processed,
        in_flight: sum_counter(rows, |r| r.in_flight),
        empty_polls: sum_counter(rows, |r| r.empty_polls),
        partitions: sum_counter(rows, |r| r.partitions),
        elapsed,
        throughput,
        progress,
    }
}

/// Sum a counter across rows, saturating at `u64::MAX`.
fn sum_counter(rows: &[StatsRow], counter: impl Fn(&StatsRow) -> Option<u64>) -> u64 {
    rows.iter()
        .filter_map(counter)
        .fold(0u64, u64::saturating_add)
}
