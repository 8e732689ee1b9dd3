//! Per-channel history charts, drawn as a line or as bars.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType},
};

use crate::history::{Channel, ChannelId, CAPACITY};
use crate::types::ChartType;
use crate::ui::theme::Palette;
use crate::ui::util::{axis_label, bar_value};

fn title(id: ChannelId, ch: &Channel) -> String {
    match ch.latest() {
        Some(v) => format!("{} now: {} / {}", id.title(), axis_label(v), axis_label(ch.ceiling())),
        None => id.title().to_string(),
    }
}

pub fn draw_channel(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    id: ChannelId,
    ch: &Channel,
    kind: ChartType,
    p: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_style())
        .title(title(id, ch))
        .style(p.base());
    match kind {
        ChartType::Line => draw_line(f, area, block, ch, p),
        ChartType::Bar => draw_bars(f, area, block, ch, p),
    }
}

fn draw_line(f: &mut ratatui::Frame<'_>, area: Rect, block: Block<'_>, ch: &Channel, p: &Palette) {
    // right-align the samples so the newest is always at the right edge
    let offset = CAPACITY.saturating_sub(ch.len());
    let points: Vec<(f64, f64)> = ch
        .samples()
        .iter()
        .enumerate()
        .map(|(i, v)| ((offset + i) as f64, *v))
        .collect();
    let ceiling = ch.ceiling();
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(p.accent))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .style(p.base())
        .x_axis(Axis::default().bounds([0.0, (CAPACITY - 1) as f64]))
        .y_axis(
            Axis::default()
                .style(Style::default().fg(p.muted))
                .bounds([0.0, ceiling])
                .labels(vec!["0".to_string(), axis_label(ceiling)]),
        );
    f.render_widget(chart, area);
}

fn draw_bars(f: &mut ratatui::Frame<'_>, area: Rect, block: Block<'_>, ch: &Channel, p: &Palette) {
    let fit = area.width.saturating_sub(2) as usize / 2;
    let start = ch.len().saturating_sub(fit);
    let data: Vec<(&str, u64)> = ch
        .samples()
        .iter()
        .skip(start)
        .map(|v| ("", bar_value(*v)))
        .collect();
    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(1)
        .bar_gap(1)
        .max(ch.ceiling().ceil().max(1.0) as u64)
        .bar_style(Style::default().fg(p.accent))
        .value_style(Style::default().fg(p.accent))
        .style(p.base());
    f.render_widget(chart, area);
}
