//! Text panel: memory, disk, database and content figures, top processes.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::dashboard::Dashboard;
use crate::ui::theme::Palette;
use crate::ui::util::truncate_middle;

fn row<'a>(label: &'a str, value: String, p: &Palette) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(p.muted)),
        Span::styled(value, Style::default().fg(p.fg)),
    ])
}

pub fn draw_info(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard, p: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_style())
        .title("Details")
        .style(p.base());
    let Some(s) = d.latest.as_ref() else {
        f.render_widget(Paragraph::new("waiting for first snapshot...").block(block), area);
        return;
    };

    let mut lines = vec![
        row(
            "RAM",
            format!("{} / {} MB ({}%)", s.ram_used_mb, s.ram_total_mb, s.ram_percent),
            p,
        ),
        row("Agent memory", format!("{} MB", s.process_memory_mb), p),
        row(
            "Disk",
            match s.disk_total_gb {
                Some(gb) => format!("{}% of {gb} GB", s.disk_percent),
                None => format!("{}%", s.disk_percent),
            },
            p,
        ),
        row("DB size", d.db_size_label(), p),
        row("MySQL buffer", d.buffer_label(), p),
        row(
            "Content",
            format!("{} posts, {} pages, {} users", s.posts, s.pages, s.users),
            p,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Top processes (by memory)",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )),
    ];
    let name_width = area.width.saturating_sub(24).max(8) as usize;
    for proc in &s.top_processes {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>7} ", proc.pid), Style::default().fg(p.muted)),
            Span::styled(
                format!("{:<w$} ", truncate_middle(&proc.name, name_width), w = name_width),
                Style::default().fg(p.fg),
            ),
            Span::styled(
                format!("{:>5.1}% mem", proc.mem_percent),
                Style::default().fg(p.fg),
            ),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
