//! Presentation transforms for stats responses.
//!
//! Raw [`StatsResponse`](botwatch_types::StatsResponse) values are turned
//! into what the UI draws: formatted summary items, table rows, the
//! throughput bar dataset and the throughput-over-time line dataset.
//!
//! ```text
//! StatsResponse
//!        │
//!        ▼
//! Dashboard::from_response()
//!        │
//!        ├──▶ summary_items()  (global totals)
//!        ├──▶ table_rows()     (one per bot or group)
//!        ├──▶ bar_dataset()    (throughput per row)
//!        └──▶ line_dataset()   (history, first five bots)
//! ```

pub mod dashboard;
pub mod format;
pub mod series;

pub use dashboard::{
    bar_dataset, summary_items, table_row, table_rows, BarItem, Dashboard, SummaryItem, TableRow,
    TABLE_HEADERS,
};
pub use format::{format_fixed, PLACEHOLDER};
pub use series::{line_dataset, LineDataset, LineSeries, TOP_SERIES};
