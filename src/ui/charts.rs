//! Throughput charts.
//!
//! The bar chart shows current throughput per row; the line chart shows
//! throughput over the history window for the first few bots seen.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{format_fixed, BarItem, LineDataset};

/// Bar values are scaled to integers with this factor.
const BAR_SCALE: f64 = 100.0;

fn chart_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let placeholder = Paragraph::new("Waiting for data...")
        .style(Style::default().fg(app.theme.border))
        .block(chart_block(app, title));
    frame.render_widget(placeholder, area);
}

/// Width of each bar so that `count` bars fill `width` columns.
pub fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let per_bar = (width as usize / count).saturating_sub(1);
    per_bar.clamp(1, 12) as u16
}

fn to_bar(item: &BarItem, style: Style) -> Bar<'static> {
    Bar::default()
        .label(Line::from(item.label.clone()))
        .value((item.value.max(0.0) * BAR_SCALE).round() as u64)
        .text_value(format_fixed(item.value, 2))
        .style(style)
}

/// Render throughput per bot as vertical bars.
pub fn render_bars(frame: &mut Frame, app: &App, area: Rect) {
    const TITLE: &str = " Throughput (msg/s) ";

    let bars = match app.data {
        Some(ref data) if !data.bars.is_empty() => &data.bars,
        _ => return render_placeholder(frame, app, area, TITLE),
    };

    let style = Style::default().fg(app.theme.bar);
    let group: Vec<Bar> = bars.iter().map(|item| to_bar(item, style)).collect();

    let inner_width = area.width.saturating_sub(2);
    let chart = BarChart::default()
        .block(chart_block(app, TITLE))
        .data(BarGroup::default().bars(&group))
        .bar_width(bar_width(inner_width, group.len()))
        .bar_gap(1)
        .bar_style(style)
        .value_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(chart, area);
}

fn x_axis(app: &App, lines: &LineDataset) -> Axis<'static> {
    let x_max = lines.len().saturating_sub(1).max(1) as f64;
    let labels: Vec<Span> = match lines.labels.as_slice() {
        [] => Vec::new(),
        [only] => vec![Span::from(only.clone())],
        [first, .., last] => {
            let middle = &lines.labels[lines.labels.len() / 2];
            vec![
                Span::from(first.clone()),
                Span::from(middle.clone()),
                Span::from(last.clone()),
            ]
        }
    };

    Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, x_max])
        .labels(labels)
}

fn y_axis(app: &App, y_max: f64) -> Axis<'static> {
    Axis::default()
        .title(Span::styled("msg/s", Style::default().fg(app.theme.border)))
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, y_max])
        .labels(vec![
            Span::from("0"),
            Span::from(format_fixed(y_max / 2.0, 1)),
            Span::from(format_fixed(y_max, 1)),
        ])
}

/// Render throughput over time, one line per bot.
///
/// A bot missing from a history entry leaves a gap in its line.
pub fn render_lines(frame: &mut Frame, app: &App, area: Rect) {
    const TITLE: &str = " Throughput over time ";

    let lines = match app.data {
        Some(ref data) if !data.lines.series.is_empty() => &data.lines,
        _ => return render_placeholder(frame, app, area, TITLE),
    };

    let segments: Vec<_> = lines
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| (i, series, series.segments()))
        .collect();

    let mut datasets = Vec::new();
    for (i, series, runs) in &segments {
        let style = Style::default().fg(app.theme.series_color(*i));
        for (n, run) in runs.iter().enumerate() {
            let graph_type = if run.len() == 1 {
                GraphType::Scatter
            } else {
                GraphType::Line
            };
            let mut dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(graph_type)
                .style(style)
                .data(run);
            // Legend entry only once per bot
            if n == 0 {
                dataset = dataset.name(series.bot_id.clone());
            }
            datasets.push(dataset);
        }
    }

    let max = lines.max_value();
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };

    let chart = Chart::new(datasets)
        .block(chart_block(app, TITLE))
        .x_axis(x_axis(app, lines))
        .y_axis(y_axis(app, y_max));

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(40, 0), 1);
        assert_eq!(bar_width(40, 4), 9);
        assert_eq!(bar_width(200, 2), 12);
        assert_eq!(bar_width(10, 20), 1);
    }
}
