//! # botwatch-types
//!
//! Wire types shared by the botwatch collector and the botwatch dashboard.
//!
//! Bots push a [`BotReport`] to the collector on every tick. The collector
//! answers dashboard polls with a [`StatsResponse`]: a [`GlobalStats`]
//! summary, one [`StatsRow`] per active bot (or per group, when an
//! [`AggregateBy`] mode is requested), and a bounded list of
//! [`HistoryEntry`] snapshots for plotting throughput over time.
//!
//! ## Example
//!
//! ```rust
//! use botwatch_types::{AggregateBy, StatsResponse};
//!
//! let body = r#"{
//!     "global": { "bots": 1, "throughput": 12.5 },
//!     "stats": [ { "bot_id": "worker-1", "throughput": 12.5 } ],
//!     "history": [],
//!     "aggregated_by": null
//! }"#;
//!
//! let response: StatsResponse = serde_json::from_str(body).unwrap();
//! assert_eq!(response.stats[0].bot_id.as_deref(), Some("worker-1"));
//! assert_eq!(AggregateBy::parse("topic"), AggregateBy::Topic);
//! ```

mod aggregate;
mod duration;
mod report;
mod response;
mod row;

pub use aggregate::*;
pub use duration::*;
pub use report::*;
pub use response::*;
pub use row::*;
