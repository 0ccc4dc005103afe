//! # botwatch
//!
//! A terminal dashboard for bot throughput stats.
//!
//! Bots report their counters to a `botwatch-server` collector; this crate
//! polls the collector and shows global totals, a per-bot table (optionally
//! grouped by IP address, topic or consumer group), current throughput per
//! bot and throughput over time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(transform)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource    │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, selection, filtering and aggregation
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with
//!   implementations for HTTP polling, saved files and in-process channels
//! - **[`data`]**: Presentation transforms from a [`StatsResponse`] to
//!   formatted summary items, table rows and chart datasets
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a collector
//! botwatch --url http://localhost:8000
//!
//! # Group rows by topic from the start
//! botwatch --aggregate-by topic
//!
//! # Inspect a saved response
//! botwatch --file botwatch_export.json
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use botwatch::{App, ChannelSource};
//!
//! let (tx, source) = ChannelSource::create("in-process");
//! let app = App::new(Box::new(source));
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

pub use app::App;
pub use botwatch_types::{AggregateBy, GlobalStats, HistoryEntry, StatsResponse, StatsRow};
pub use data::Dashboard;
pub use source::{
    ChannelSource, DataSource, FileSource, HttpSource, HttpSourceConfig, SourceError,
};
