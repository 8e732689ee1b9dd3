//! Client-side state fed by each snapshot: badges, chart channels, labels.

use crate::alerts::AlertBoard;
use crate::history::{ChannelId, Channels};
use crate::types::{BufferPool, Settings, Stats};

/// Order of the overview bars.
pub const OVERVIEW_LABELS: [&str; 6] = ["CPU", "RAM", "Disk", "Up", "Down", "Buffer"];

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub settings: Settings,
    pub channels: Channels,
    pub alerts: AlertBoard,
    pub latest: Option<Stats>,
    pub overview: [f64; 6],
    pub updates: u64,
}

impl Dashboard {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Distribute one snapshot to the alert board and every channel.
    pub fn apply(&mut self, stats: Stats) {
        self.alerts = AlertBoard::evaluate(&stats, &self.settings.alert_thresholds);

        self.channels.push(ChannelId::Cpu, stats.cpu);
        self.channels.push(ChannelId::Ram, stats.ram_percent);
        self.channels.push(ChannelId::Disk, stats.disk_percent);
        self.channels.push(ChannelId::NetUp, stats.net_up);
        self.channels.push(ChannelId::NetDown, stats.net_down);
        self.channels.push(ChannelId::DbSize, stats.db_size_mb);
        self.channels
            .get_mut(ChannelId::MysqlBuffer)
            .scale_mut()
            .retarget(stats.mysql_buffer_total_mb);
        self.channels
            .push(ChannelId::MysqlBuffer, stats.mysql_buffer_mb);

        self.overview = [
            stats.cpu,
            stats.ram_percent,
            stats.disk_percent,
            stats.net_up,
            stats.net_down,
            stats.mysql_buffer_percent,
        ];
        self.latest = Some(stats);
        self.updates += 1;
    }

    pub fn uptime_label(&self) -> &str {
        self.latest
            .as_ref()
            .map(|s| s.uptime.as_str())
            .filter(|u| !u.is_empty())
            .unwrap_or("N/A")
    }

    pub fn load_label(&self) -> String {
        match self.latest.as_ref().and_then(|s| s.load_avg) {
            Some([a, b, c]) => format!("{a:.2}, {b:.2}, {c:.2}"),
            None => "N/A".into(),
        }
    }

    pub fn db_size_label(&self) -> String {
        match self.latest.as_ref() {
            Some(s) if !s.db_size_formatted.is_empty() => s.db_size_formatted.clone(),
            Some(s) if s.db_size_mb > 0.0 => format!("{} MB", s.db_size_mb),
            _ => "-".into(),
        }
    }

    pub fn buffer_label(&self) -> String {
        let Some(s) = self.latest.as_ref() else {
            return "N/A".into();
        };
        if !s.mysql_buffer_formatted.is_empty() {
            return s.mysql_buffer_formatted.clone();
        }
        match s.mysql_buffer {
            BufferPool::Usage {
                used_mb,
                total_mb,
                percent,
            } => format!("{used_mb} / {total_mb} MB ({percent}%)"),
            BufferPool::AllocatedOnly { total_mb } => format!("{total_mb} MB (Allocated)"),
            BufferPool::PermissionDenied => "Permission Denied".into(),
            BufferPool::Unavailable => "N/A".into(),
        }
    }

    pub fn toggle_chart_type(&mut self) {
        self.settings.chart_type = self.settings.chart_type.toggled();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.settings.dark_mode = !self.settings.dark_mode;
    }
}
