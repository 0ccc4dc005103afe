//! Stats table rendering.
//!
//! One row per bot, or per group when the collector aggregated the rows.
//! Rows keep the collector's order (throughput, descending).

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::TABLE_HEADERS;

/// Render the stats table.
///
/// The scroll offset is carried across frames in `app.table_offset` so mouse
/// clicks can be mapped back to rows.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref data) = app.data else {
        let placeholder = Paragraph::new("Waiting for data...")
            .style(Style::default().fg(app.theme.border))
            .block(block.title(" Bots "));
        frame.render_widget(placeholder, area);
        return;
    };

    let visible = app.visible_rows();

    let header = Row::new(TABLE_HEADERS.iter().map(|h| Cell::from(*h)))
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = visible
        .iter()
        .filter_map(|&i| data.rows.get(i))
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.as_str()))))
        .collect();

    let widths = [
        Constraint::Fill(3), // Bot
        Constraint::Fill(2), // IP
        Constraint::Fill(2), // Topic
        Constraint::Fill(2), // Group
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let selected = app.selected_index.min(visible.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !visible.is_empty() {
        format!(" [{}/{}]", selected + 1, visible.len())
    } else {
        String::new()
    };

    let noun = if data.aggregated_by.field().is_some() {
        format!("Groups by {}", data.aggregated_by.label())
    } else {
        "Bots".to_string()
    };

    let title = format!(
        " {} ({}/{}){}{} ",
        noun,
        visible.len(),
        data.rows.len(),
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_offset(app.table_offset);
    if !visible.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
    app.table_offset = state.offset();
}
