//! Grouping of per-bot rows by a shared field.

use std::collections::HashMap;

use botwatch_types::{value_text, StatsRow};
use serde_json::{Map, Number, Value};

/// Pass-through counters that are summed when present.
const SUMMED_EXTRAS: [&str; 3] = ["erred", "queue_size", "transactions"];

/// Pass-through descriptors copied from the first member that has them.
const COPIED_EXTRAS: [&str; 3] = ["topic", "group_id", "register_at"];

/// Running sum that stays integral until a fractional value shows up.
#[derive(Debug, Clone, Copy)]
enum Sum {
    Int(u64),
    Float(f64),
}

impl Sum {
    fn add(self, value: Option<&Value>) -> Self {
        let Some(Value::Number(n)) = value else {
            return self;
        };
        match (self, n.as_u64()) {
            (Sum::Int(acc), Some(v)) => Sum::Int(acc.saturating_add(v)),
            (acc, _) => Sum::Float(acc.as_f64() + n.as_f64().unwrap_or(0.0)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Sum::Int(v) => v as f64,
            Sum::Float(v) => v,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Sum::Int(v) => Value::from(v),
            Sum::Float(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug)]
struct Group {
    key: String,
    received: u64,
    processed: u64,
    in_flight: u64,
    empty_polls: u64,
    partitions: u64,
    throughput: f64,
    extras: [Sum; 3],
    bots: Vec<String>,
    timestamp: Option<f64>,
    ip_address: Option<String>,
    copied: Map<String, Value>,
}

impl Group {
    fn new(key: String) -> Self {
        Self {
            key,
            received: 0,
            processed: 0,
            in_flight: 0,
            empty_polls: 0,
            partitions: 0,
            throughput: 0.0,
            extras: [Sum::Int(0); 3],
            bots: Vec::new(),
            timestamp: None,
            ip_address: None,
            copied: Map::new(),
        }
    }

    fn absorb(&mut self, row: &StatsRow) {
        self.received = self.received.saturating_add(row.received.unwrap_or(0));
        self.processed = self.processed.saturating_add(row.processed.unwrap_or(0));
        self.in_flight = self.in_flight.saturating_add(row.in_flight.unwrap_or(0));
        self.empty_polls = self.empty_polls.saturating_add(row.empty_polls.unwrap_or(0));
        self.partitions = self.partitions.saturating_add(row.partitions.unwrap_or(0));
        self.throughput += row.throughput_or_zero();

        for (sum, name) in self.extras.iter_mut().zip(SUMMED_EXTRAS) {
            *sum = sum.add(row.extra.get(name));
        }

        self.bots.push(row.bot_id.clone().unwrap_or_default());

        let ts = row.timestamp_or_zero();
        if self.timestamp.map_or(true, |current| ts > current) {
            self.timestamp = Some(ts);
        }

        if self.ip_address.is_none() {
            self.ip_address = row.ip_address.clone();
        }
        for name in COPIED_EXTRAS {
            if self.copied.contains_key(name) {
                continue;
            }
            if let Some(value) = row.extra.get(name) {
                self.copied.insert(name.to_string(), value.clone());
            }
        }
    }

    fn into_row(self) -> StatsRow {
        let mut extra = self.copied;
        for (sum, name) in self.extras.into_iter().zip(SUMMED_EXTRAS) {
            extra.insert(name.to_string(), sum.into_value());
        }

        StatsRow {
            bot_id: Some(format!("{} ({} bots)", self.key, self.bots.len())),
            received: Some(self.received),
            processed: Some(self.processed),
            in_flight: Some(self.in_flight),
            throughput: Some(self.throughput),
            elapsed: None,
            empty_polls: Some(self.empty_polls),
            partitions: Some(self.partitions),
            progress: None,
            timestamp: self.timestamp,
            ip_address: self.ip_address,
            bots_count: Some(self.bots.len()),
            bots: Some(self.bots),
            extra,
        }
    }
}

/// Fold rows into one row per distinct value of `field`.
///
/// Rows that lack the field are dropped. Groups come out in the order their
/// key was first seen; callers re-sort as needed.
pub fn aggregate_rows(rows: &[StatsRow], field: &str) -> Vec<StatsRow> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(value) = row.field(field) else {
            continue;
        };
        // Keyed on the JSON form so that "7" and 7 stay separate groups.
        let slot = *index.entry(value.to_string()).or_insert_with(|| {
            groups.push(Group::new(value_text(&value)));
            groups.len() - 1
        });
        groups[slot].absorb(row);
    }

    groups.into_iter().map(Group::into_row).collect()
}

/// Sort rows by throughput, highest first. Ties keep their relative order.
pub fn sort_by_throughput(rows: &mut [StatsRow]) {
    rows.sort_by(|a, b| b.throughput_or_zero().total_cmp(&a.throughput_or_zero()));
}
