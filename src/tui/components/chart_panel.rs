//! Drawing chart windows.

use crate::chart::{ChartData, ChartKind, ChartSpec, LineSeries, PALETTE, palette_color};
use crate::core::value::format_number;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph},
};

pub const EMPTY_CHART: &str = "No valid data to display.";

/// Render a chart with `selected` as the highlighted point.
pub fn render_chart(
    frame: &mut Frame,
    area: Rect,
    spec: &ChartSpec,
    data: &ChartData,
    selected: usize,
    theme: &Theme,
) {
    if data.is_empty() {
        let empty = Paragraph::new(EMPTY_CHART)
            .style(theme.muted_style())
            .alignment(Alignment::Center);
        let middle = Rect {
            y: area.y + area.height / 2,
            height: 1.min(area.height),
            ..area
        };
        frame.render_widget(empty, middle);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    match (spec.kind, data) {
        (ChartKind::Line, ChartData::Line(series)) => {
            render_line(frame, chunks[0], series, selected, theme)
        }
        (ChartKind::Pie, _) => render_shares(frame, chunks[0], data, selected, theme),
        _ => render_bars(frame, chunks[0], data, selected),
    }

    let pairs = data.pairs();
    if let Some((category, value)) = pairs.get(selected.min(pairs.len() - 1)) {
        let footer = Line::from(vec![
            Span::styled(format!("{}: ", spec.x_key), theme.muted_style()),
            Span::styled(category.to_string(), theme.header_style()),
            Span::styled(format!("  {}: ", spec.y_key), theme.muted_style()),
            Span::raw(format_number(*value)),
            Span::styled("   Enter: drill down", theme.muted_style()),
        ]);
        frame.render_widget(Paragraph::new(footer), chunks[1]);
    }
}

fn render_bars(frame: &mut Frame, area: Rect, data: &ChartData, selected: usize) {
    let pairs = data.pairs();
    let bars: Vec<Bar> = pairs
        .iter()
        .enumerate()
        .map(|(i, (category, value))| {
            let mut style = Style::default().fg(palette_color(i));
            if i == selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format_number(*value))
                .label(Line::from(category.to_string()))
                .style(style)
        })
        .collect();

    let count = bars.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(count) / count).clamp(1, 12);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    frame.render_widget(chart, area);
}

/// Share of total for each point, as proportional horizontal bars.
fn render_shares(frame: &mut Frame, area: Rect, data: &ChartData, selected: usize, theme: &Theme) {
    let pairs = data.pairs();
    let total: f64 = pairs.iter().map(|(_, v)| v.max(0.0)).sum();
    let label_width = pairs
        .iter()
        .map(|(c, _)| c.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let bar_room = (area.width as usize).saturating_sub(label_width + 20).max(1);

    let lines: Vec<Line> = pairs
        .iter()
        .enumerate()
        .map(|(i, (category, value))| {
            let share = if total > 0.0 { value.max(0.0) / total } else { 0.0 };
            let filled = (share * bar_room as f64).round() as usize;
            let color = PALETTE[i % PALETTE.len()];
            let marker = if i == selected { "▶ " } else { "  " };
            let label: String = category.chars().take(label_width).collect();
            let mut label_style = Style::default();
            if i == selected {
                label_style = theme.header_style();
            }
            Line::from(vec![
                Span::raw(marker),
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(format!("{label:<label_width$} "), label_style),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::raw(format!(" {:>5.1}%", share * 100.0)),
            ])
        })
        .collect();

    let offset = selected.saturating_sub(area.height.saturating_sub(1) as usize);
    frame.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), area);
}

fn render_line(frame: &mut Frame, area: Rect, series: &LineSeries, selected: usize, theme: &Theme) {
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.y))
        .collect();
    let highlight: Vec<(f64, f64)> = points.get(selected).copied().into_iter().collect();

    let (min_y, max_y) = points
        .iter()
        .fold((0.0f64, 0.0f64), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));
    let max_y = if max_y <= min_y { min_y + 1.0 } else { max_y * 1.1 };
    let max_x = (points.len().saturating_sub(1)).max(1) as f64;

    let first = series.points.first().map(|p| p.x.clone()).unwrap_or_default();
    let last = series.points.last().map(|p| p.x.clone()).unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name(series.id.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(palette_color(0)))
            .data(&points),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(palette_color(2)))
            .data(&highlight),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default())
        .x_axis(
            Axis::default()
                .style(theme.muted_style())
                .bounds([0.0, max_x])
                .labels(vec![first, last]),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted_style())
                .bounds([min_y, max_y])
                .labels(vec![format_number(min_y), format_number(max_y.round())]),
        );
    frame.render_widget(chart, area);
}
