//! Types that mirror the agent's JSON schema.
//!
//! The core metric fields of a snapshot are required, so a 2xx reply that is
//! not a snapshot fails to decode and the transport reports it as malformed.
//! Supplementary fields default so an older agent still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BufferPool {
    Usage {
        used_mb: f64,
        total_mb: f64,
        percent: f64,
    },
    AllocatedOnly {
        total_mb: f64,
    },
    PermissionDenied,
    #[default]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub mem_percent: f32,
    pub cpu_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Stats {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    pub cpu: f64,
    #[serde(default)]
    pub load_avg: Option<[f64; 3]>,
    pub ram_percent: f64,
    pub ram_total_mb: f64,
    pub ram_used_mb: f64,
    #[serde(default)]
    pub process_memory_mb: f64,
    pub disk_percent: f64,
    #[serde(default)]
    pub disk_total_gb: Option<f64>,
    pub uptime: String,
    pub net_up: f64,
    pub net_down: f64,
    pub db_size_mb: f64,
    #[serde(default)]
    pub db_size_formatted: String,
    #[serde(default)]
    pub mysql_buffer: BufferPool,
    pub mysql_buffer_mb: f64,
    pub mysql_buffer_total_mb: f64,
    pub mysql_buffer_percent: f64,
    #[serde(default)]
    pub mysql_buffer_formatted: String,
    pub posts: u64,
    pub pages: u64,
    pub users: u64,
    #[serde(default)]
    pub top_processes: Vec<ProcessInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl ChartType {
    pub fn toggled(self) -> Self {
        match self {
            ChartType::Line => ChartType::Bar,
            ChartType::Bar => ChartType::Line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub cpu: u8,
    pub ram: u8,
    pub disk: u8,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu: 80,
            ram: 80,
            disk: 90,
        }
    }
}

/// Dashboard settings as served by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub refresh_interval_s: u64,
    pub cache_ttl_s: u64,
    pub use_real_metrics: bool,
    pub alert_thresholds: AlertThresholds,
    pub chart_type: ChartType,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_s: 2,
            cache_ttl_s: 2,
            use_real_metrics: false,
            alert_thresholds: AlertThresholds::default(),
            chart_type: ChartType::Line,
            dark_mode: false,
        }
    }
}

/// Reply of the session endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    pub nonce: String,
    #[serde(default)]
    pub settings: Settings,
}

/// Fallback-transport reply wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
