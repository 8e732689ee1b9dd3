//! Overview bars: the six headline values side by side.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{BarChart, Block, Borders},
};

use crate::dashboard::{Dashboard, OVERVIEW_LABELS};
use crate::ui::theme::Palette;
use crate::ui::util::bar_value;

pub fn draw_overview(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard, p: &Palette) {
    let data: Vec<(&str, u64)> = OVERVIEW_LABELS
        .iter()
        .zip(d.overview.iter())
        .map(|(l, v)| (*l, bar_value(*v)))
        .collect();
    let inner_width = area.width.saturating_sub(2);
    let gap = 1u16;
    let bar_width = (inner_width / OVERVIEW_LABELS.len() as u16)
        .saturating_sub(gap)
        .max(1);
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(p.border_style())
                .title("Overview"),
        )
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(gap)
        .max(100)
        .bar_style(Style::default().fg(p.accent))
        .value_style(Style::default().fg(p.bg).bg(p.accent))
        .label_style(Style::default().fg(p.fg))
        .style(p.base());
    f.render_widget(chart, area);
}
