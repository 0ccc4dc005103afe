use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;

/// File written by the export key.
pub const EXPORT_PATH: &str = "botwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Aggregation
        KeyCode::Char('a') => app.next_aggregation(),
        KeyCode::Char('A') => app.prev_aggregation(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Poll now
        KeyCode::Char('r') => {
            app.refresh();
            let _ = app.reload_data();
        }

        KeyCode::Char('?') => app.toggle_help(),

        // Filter (start typing to filter)
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') | KeyCode::Esc => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events.
///
/// `table_header_row` is the screen row of the table's column headers.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, table_header_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click to select; screen rows are relative to the scrolled table
        MouseEventKind::Down(MouseButton::Left) if mouse.row > table_header_row => {
            let item_row = app.table_offset + (mouse.row - table_header_row - 1) as usize;
            if item_row < app.visible_rows().len() {
                app.selected_index = item_row;
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use botwatch_types::{AggregateBy, StatsResponse, StatsRow};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let (tx, source) = ChannelSource::create("test");
        let rows = ["a", "b", "c"]
            .iter()
            .map(|id| StatsRow {
                bot_id: Some(id.to_string()),
                ..Default::default()
            })
            .collect();
        tx.send(StatsResponse {
            stats: rows,
            ..Default::default()
        })
        .unwrap();
        let mut app = App::new(Box::new(source));
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_aggregation_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.aggregation, AggregateBy::IpAddress);
        handle_key_event(&mut app, key(KeyCode::Char('A')));
        handle_key_event(&mut app, key(KeyCode::Char('A')));
        assert_eq!(app.aggregation, AggregateBy::GroupId);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_index, 2);
        handle_key_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selected_index, 1);
        handle_key_event(&mut app, key(KeyCode::Home));
        assert_eq!(app.selected_index, 0);
        handle_key_event(&mut app, key(KeyCode::End));
        assert_eq!(app.selected_index, 2);
    }

    #[test]
    fn test_filter_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);

        // 'q' and 'a' are text while filtering
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        assert!(app.running);
        assert_eq!(app.filter_text, "a");
        assert_eq!(app.aggregation, AggregateBy::None);

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.visible_rows(), vec![0]);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_mouse_click_selects_row() {
        let mut app = app();
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };

        handle_mouse_event(&mut app, click(7), 5);
        assert_eq!(app.selected_index, 1);

        // Below the last row
        handle_mouse_event(&mut app, click(20), 5);
        assert_eq!(app.selected_index, 1);
    }
}
