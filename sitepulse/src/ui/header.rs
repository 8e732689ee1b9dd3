//! Top header: uptime, load and the cpu/ram/disk alert badges.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::alerts::Severity;
use crate::dashboard::Dashboard;
use crate::ui::theme::{severity_color, Palette};

fn badge(name: &str, sev: Severity) -> Span<'static> {
    Span::styled(
        format!(" {name} {} ", sev.label()),
        Style::default()
            .fg(ratatui::style::Color::Black)
            .bg(severity_color(sev))
            .add_modifier(Modifier::BOLD),
    )
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard, p: &Palette) {
    let status = if let Some(s) = d.latest.as_ref() {
        let at = s
            .generated_at
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        format!(
            "uptime: {} | load: {} | updated {at}",
            d.uptime_label(),
            d.load_label()
        )
    } else {
        "connecting...".into()
    };
    let line = Line::from(vec![
        Span::styled(
            "sitepulse ",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{status}  "), Style::default().fg(p.fg)),
        badge("CPU", d.alerts.cpu),
        Span::raw(" "),
        badge("RAM", d.alerts.ram),
        Span::raw(" "),
        badge("DISK", d.alerts.disk),
        Span::styled(
            "  (q quit, t chart type, d dark mode)",
            Style::default().fg(p.muted),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(p.border_style())
        .style(p.base());
    f.render_widget(Paragraph::new(line).block(block), area);
}
