//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use botwatch_types::AggregateBy;

use crate::data::Dashboard;
use crate::source::DataSource;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<Dashboard>,
    pub load_error: Option<String>,

    /// Grouping requested from the source.
    pub aggregation: AggregateBy,

    /// Selected row, as a position in the filtered table.
    pub selected_index: usize,
    /// First filtered row shown by the table at the last draw.
    pub table_offset: usize,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from the given source.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            data: None,
            load_error: None,
            aggregation: AggregateBy::None,
            selected_index: 0,
            table_offset: 0,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Create an App and request an initial aggregation mode from the source.
    pub fn with_aggregation(source: Box<dyn DataSource>, aggregation: AggregateBy) -> Self {
        let mut app = Self::new(source);
        app.set_aggregation(aggregation);
        app
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new data.
    ///
    /// Returns `Ok(true)` if new data was received. The source's current
    /// error, if any, is kept in `load_error`; after a failed fetch the
    /// previous data stays on screen.
    pub fn reload_data(&mut self) -> Result<bool> {
        let response = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(response) = response else {
            return Ok(false);
        };
        self.data = Some(Dashboard::from_response(response));
        self.clamp_selection();
        Ok(true)
    }

    /// Ask the source to fetch again now.
    pub fn refresh(&mut self) {
        self.source.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Request a new aggregation mode from the source.
    pub fn set_aggregation(&mut self, mode: AggregateBy) {
        self.aggregation = mode;
        self.source.set_aggregation(mode);
        self.selected_index = 0;
    }

    /// Cycle to the next aggregation mode.
    pub fn next_aggregation(&mut self) {
        self.set_aggregation(self.aggregation.next());
        self.set_status_message(format!("Aggregate by: {}", self.aggregation.label()));
    }

    /// Cycle to the previous aggregation mode.
    pub fn prev_aggregation(&mut self) {
        self.set_aggregation(self.aggregation.prev());
        self.set_status_message(format!("Aggregate by: {}", self.aggregation.label()));
    }

    /// Raw indices of the table rows that pass the filter, in display order.
    pub fn visible_rows(&self) -> Vec<usize> {
        self.data
            .as_ref()
            .map(|data| data.filtered_indices(&self.filter_text))
            .unwrap_or_default()
    }

    /// Raw index of the selected row.
    pub fn selected_row(&self) -> Option<usize> {
        self.visible_rows().get(self.selected_index).copied()
    }

    /// Seconds since the last successful update.
    pub fn seconds_since_update(&self) -> Option<u64> {
        self.data
            .as_ref()
            .map(|data| data.last_updated.elapsed().as_secs())
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_rows().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_rows().len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_rows().len().saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.selected_index = 0;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the last received response to `path` as pretty JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(&data.response)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
