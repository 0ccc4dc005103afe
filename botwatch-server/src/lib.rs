//! # botwatch-server
//!
//! Collector for bot throughput stats.
//!
//! Bots `POST` their counters to `/update`; the collector keeps the latest
//! report per bot in memory, and answers `GET /api/stats` with totals across
//! recently active bots, one row per bot (or per group when
//! `aggregate_by=ip_address|topic|group_id` is given), and a bounded history
//! of snapshots for the throughput-over-time chart.
//!
//! ```text
//!  bot ──POST /update──▶ ┌────────────┐ ◀──GET /api/stats── botwatch (TUI)
//!  bot ──POST /update──▶ │ StatsStore │ ◀──GET /metrics──── Prometheus
//!  bot ──POST /update──▶ └────────────┘
//! ```
//!
//! Nothing is persisted; restarting the collector starts from an empty
//! store.

pub mod aggregate;
pub mod config;
mod error;
pub mod http;
pub mod metrics;
pub mod store;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::Server;
pub use store::{compute_global, StatsStore};
