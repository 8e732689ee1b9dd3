//! App state and main loop: input handling, draining polled snapshots, drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;

use crate::dashboard::Dashboard;
use crate::history::ChannelId;
use crate::types::{Settings, Stats};
use crate::ui::{
    charts::draw_channel, header::draw_header, info::draw_info, overview::draw_overview,
    theme::palette,
};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Chart grid, two per row; the buffer-pool chart gets the last row to itself.
const CHART_ROWS: [&[ChannelId]; 4] = [
    &[ChannelId::Cpu, ChannelId::Ram],
    &[ChannelId::Disk, ChannelId::DbSize],
    &[ChannelId::NetUp, ChannelId::NetDown],
    &[ChannelId::MysqlBuffer],
];

pub struct App {
    pub dashboard: Dashboard,
    rx: mpsc::Receiver<Stats>,
    should_quit: bool,
}

impl App {
    pub fn new(settings: Settings, rx: mpsc::Receiver<Stats>) -> Self {
        Self {
            dashboard: Dashboard::new(settings),
            rx,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        res
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        loop {
            while event::poll(Duration::ZERO)? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k.code);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            self.drain();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(INPUT_POLL)? {
                continue;
            }
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Apply every snapshot the poller has delivered since the last frame.
    pub fn drain(&mut self) {
        while let Ok(stats) = self.rx.try_recv() {
            self.dashboard.apply(stats);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('t') => self.dashboard.toggle_chart_type(),
            KeyCode::Char('d') => self.dashboard.toggle_dark_mode(),
            _ => {}
        }
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let d = &self.dashboard;
        let p = palette(d.settings.dark_mode);
        let area = f.area();
        f.render_widget(Block::default().style(p.base()), area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(12)])
            .split(area);
        draw_header(f, rows[0], d, &p);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(rows[1]);
        self.draw_charts(f, body[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(6)])
            .split(body[1]);
        draw_overview(f, side[0], d, &p);
        draw_info(f, side[1], d, &p);
    }

    fn draw_charts(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let d = &self.dashboard;
        let p = palette(d.settings.dark_mode);
        let grid = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);
        for (ids, row) in CHART_ROWS.iter().zip(grid.iter()) {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, ids.len() as u32); ids.len()])
                .split(*row);
            for (id, cell) in ids.iter().zip(cols.iter()) {
                draw_channel(
                    f,
                    *cell,
                    *id,
                    d.channels.get(*id),
                    d.settings.chart_type,
                    &p,
                );
            }
        }
    }
}
