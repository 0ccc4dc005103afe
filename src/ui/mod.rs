//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`common`]: Header, summary bar, status bar and help overlay
//! - [`table`]: Per-bot (or per-group) stats table
//! - [`charts`]: Throughput bar chart and throughput-over-time line chart
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Summary (common::render_summary)     │
//! ├──────────────────────────────────────┤
//! │ Table (table::render)                │
//! ├───────────────────┬──────────────────┤
//! │ Bars              │ Lines            │
//! │ (charts::bars)    │ (charts::lines)  │
//! ├───────────────────┴──────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Help overlay rendered on top
//! ```

pub mod charts;
pub mod common;
pub mod table;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

const HEADER_HEIGHT: u16 = 1;
const SUMMARY_HEIGHT: u16 = 4;

/// Screen row holding the table's column headers (below its top border).
pub const TABLE_HEADER_ROW: u16 = HEADER_HEIGHT + SUMMARY_HEIGHT + 1;

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Length(SUMMARY_HEIGHT),
        Constraint::Min(4),
        Constraint::Percentage(40),
        Constraint::Length(1),
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_summary(frame, app, chunks[1]);
    table::render(frame, app, chunks[2]);

    let charts = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    charts::render_bars(frame, app, charts[0]);
    charts::render_lines(frame, app, charts[1]);

    common::render_status_bar(frame, app, chunks[4]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, FileSource};
    use botwatch_types::{GlobalStats, HistoryEntry, StatsResponse, StatsRow};
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn sample_app() -> App {
        let row = |id: &str, tp: f64| StatsRow {
            bot_id: Some(id.to_string()),
            received: Some(100),
            throughput: Some(tp),
            ..Default::default()
        };
        let response = StatsResponse {
            global: Some(GlobalStats {
                bots: 2,
                received: 200,
                throughput: 4.5,
                ..Default::default()
            }),
            stats: vec![row("bot-one", 3.0), row("bot-two", 1.5)],
            history: vec![HistoryEntry {
                timestamp: 1_700_000_000.0,
                stats: vec![row("bot-one", 3.0)],
            }],
            aggregated_by: None,
        };
        let (tx, source) = ChannelSource::create("test");
        tx.send(response).unwrap();
        let mut app = App::new(Box::new(source));
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn test_draw_full_dashboard() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("BOTWATCH"));
        assert!(text.contains("Throughput"));
        assert!(text.contains("bot-one"));
        assert!(text.contains("bot-two"));
        assert!(text.contains("channel: test"));
    }

    #[test]
    fn test_draw_too_small() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }

    #[test]
    fn test_draw_help_overlay() {
        let mut app = sample_app();
        app.toggle_help();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_draw_shows_source_error() {
        let mut app = App::new(Box::new(FileSource::new("/missing.json")));
        assert!(!app.reload_data().unwrap());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("file: /missing.json"));
        assert!(text.contains("Error: Failed to read /missing.json"));
    }

    #[test]
    fn test_click_after_scroll_selects_visible_row() {
        let rows = (0..30)
            .map(|i| StatsRow {
                bot_id: Some(format!("bot-{:02}", i)),
                ..Default::default()
            })
            .collect();
        let (tx, source) = ChannelSource::create("test");
        tx.send(StatsResponse {
            stats: rows,
            ..Default::default()
        })
        .unwrap();
        let mut app = App::new(Box::new(source));
        app.reload_data().unwrap();
        app.select_last();

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let offset = app.table_offset;
        assert!(offset > 0);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: TABLE_HEADER_ROW + 1,
            modifiers: KeyModifiers::NONE,
        };
        crate::events::handle_mouse_event(&mut app, click, TABLE_HEADER_ROW);
        assert_eq!(app.selected_index, offset);
        assert_eq!(app.selected_row(), Some(offset));
    }
}
