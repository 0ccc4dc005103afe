//! Common UI components.
//!
//! This module contains the header bar, summary bar, status bar, and help overlay.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::summary_items;

/// Seconds without an update after which the data is shown as stale.
const STALE_AFTER_SECS: u64 = 10;

/// Render the header bar: connection indicator, bot count and aggregation.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" BOTWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let stale = app
        .seconds_since_update()
        .is_some_and(|secs| secs >= STALE_AFTER_SECS);
    let status_style = if app.load_error.is_some() {
        app.theme.error_style()
    } else if stale {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().fg(app.theme.ok)
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("BOTWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", data.rows.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(if data.aggregated_by.field().is_some() {
            " groups │ "
        } else {
            " bots │ "
        }),
        Span::raw("Aggregate by: "),
        Span::styled(app.aggregation.label(), Style::default().fg(app.theme.highlight)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the global totals as a two-line label/value grid.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let items = app
        .data
        .as_ref()
        .map(|d| d.summary.clone())
        .unwrap_or_else(|| summary_items(None));

    let header = Row::new(
        items
            .iter()
            .map(|item| Cell::from(item.label))
            .collect::<Vec<_>>(),
    )
    .style(app.theme.label);
    let values = Row::new(
        items
            .iter()
            .map(|item| Cell::from(item.value.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let widths = vec![Constraint::Fill(1); items.len()];
    let table = Table::new(vec![values], widths).header(header).block(
        Block::default()
            .title(" Totals ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, aggregation, seconds since the last update or the
/// last error, and the main controls. Temporary messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        "a:aggregate /:search r:refresh e:export ?:help q:quit"
    };

    let (state, style) = match (&app.load_error, app.seconds_since_update()) {
        (Some(err), _) => (format!("Error: {}", err), app.theme.error_style()),
        (None, Some(secs)) => (
            format!("Updated {}s ago", secs),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (None, None) => (
            "Loading...".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} | {} | ", app.source_description(), app.aggregation.label()),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::styled(state, style),
        Span::styled(
            format!(" | {}", controls),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Select row"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Table"),
        Line::from("  a / A       Next/previous aggregation"),
        Line::from("  /           Filter by bot"),
        Line::from("  c           Clear filter"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to botwatch_export.json"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 48u16.min(area.width.saturating_sub(4));
    let help_height = 21u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
