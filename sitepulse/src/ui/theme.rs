//! Light and dark palettes; the alert colours are shared.

use ratatui::style::{Color, Style};

use crate::alerts::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub border: Color,
    pub accent: Color,
    pub muted: Color,
}

pub const DARK: Palette = Palette {
    bg: Color::Rgb(24, 26, 32),
    fg: Color::Rgb(220, 222, 228),
    border: Color::Rgb(90, 94, 110),
    accent: Color::Cyan,
    muted: Color::Rgb(140, 144, 160),
};

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(245, 246, 248),
    fg: Color::Rgb(30, 32, 38),
    border: Color::Rgb(170, 170, 180),
    accent: Color::Blue,
    muted: Color::Rgb(110, 112, 120),
};

pub fn palette(dark: bool) -> Palette {
    if dark {
        DARK
    } else {
        LIGHT
    }
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border).bg(self.bg)
    }
}

pub fn severity_color(s: Severity) -> Color {
    match s {
        Severity::Ok => Color::Green,
        Severity::Warn => Color::Yellow,
        Severity::Crit => Color::Red,
    }
}
