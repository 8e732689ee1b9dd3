//! Snapshot types produced by the resolver and the JSON shape sent to clients.
//! `StatsPayload` defines the wire format; keep field names stable.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RamUsage {
    pub used_mb: f64,
    pub total_mb: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskUsage {
    pub percent: f64,
    // None when the space query failed and the percent is synthetic
    pub total_gb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetRates {
    pub up_mbps: f64,
    pub down_mbps: f64,
}

/// InnoDB buffer-pool reading. A privilege failure is a value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BufferPool {
    Usage {
        used_mb: f64,
        total_mb: f64,
        percent: f64,
    },
    /// Allocated size known, page counters missing.
    AllocatedOnly { total_mb: f64 },
    PermissionDenied,
    Unavailable,
}

impl BufferPool {
    pub fn used_mb(&self) -> f64 {
        match self {
            BufferPool::Usage { used_mb, .. } => *used_mb,
            _ => 0.0,
        }
    }

    pub fn total_mb(&self) -> f64 {
        match self {
            BufferPool::Usage { total_mb, .. } | BufferPool::AllocatedOnly { total_mb } => {
                *total_mb
            }
            _ => 0.0,
        }
    }

    pub fn percent(&self) -> f64 {
        match self {
            BufferPool::Usage { percent, .. } => *percent,
            _ => 0.0,
        }
    }

    pub fn formatted(&self) -> String {
        match self {
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
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub posts: u64,
    pub pages: u64,
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub mem_percent: f32,
    pub cpu_percent: f32,
}

/// One complete resolution cycle. Immutable once built; shared through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub generated_at: DateTime<Utc>,
    pub cpu_percent: f64,
    pub load_avg: Option<[f64; 3]>,
    pub ram: RamUsage,
    pub process_memory_mb: f64,
    pub disk: DiskUsage,
    pub net: NetRates,
    pub uptime: String,
    pub db_size_mb: f64,
    pub mysql_buffer: BufferPool,
    pub counts: Counts,
    pub top_processes: Vec<ProcessInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsPayload {
    pub generated_at: DateTime<Utc>,
    pub cpu: f64,
    pub load_avg: Option<[f64; 3]>,
    pub ram_percent: f64,
    pub ram_total_mb: f64,
    pub ram_used_mb: f64,
    pub process_memory_mb: f64,
    pub disk_percent: f64,
    pub disk_total_gb: Option<f64>,
    pub uptime: String,
    pub net_up: f64,
    pub net_down: f64,
    pub db_size_mb: f64,
    pub db_size_formatted: String,
    pub mysql_buffer: BufferPool,
    pub mysql_buffer_mb: f64,
    pub mysql_buffer_total_mb: f64,
    pub mysql_buffer_percent: f64,
    pub mysql_buffer_formatted: String,
    pub posts: u64,
    pub pages: u64,
    pub users: u64,
    pub top_processes: Vec<ProcessInfo>,
}

impl From<&MetricSnapshot> for StatsPayload {
    fn from(s: &MetricSnapshot) -> Self {
        let db_size_formatted = if s.db_size_mb > 0.0 {
            format!("{} MB", s.db_size_mb)
        } else {
            "-".into()
        };
        Self {
            generated_at: s.generated_at,
            cpu: s.cpu_percent,
            load_avg: s.load_avg,
            ram_percent: s.ram.percent,
            ram_total_mb: s.ram.total_mb,
            ram_used_mb: s.ram.used_mb,
            process_memory_mb: s.process_memory_mb,
            disk_percent: s.disk.percent,
            disk_total_gb: s.disk.total_gb,
            uptime: s.uptime.clone(),
            net_up: s.net.up_mbps,
            net_down: s.net.down_mbps,
            db_size_mb: s.db_size_mb,
            db_size_formatted,
            mysql_buffer: s.mysql_buffer,
            mysql_buffer_mb: s.mysql_buffer.used_mb(),
            mysql_buffer_total_mb: s.mysql_buffer.total_mb(),
            mysql_buffer_percent: s.mysql_buffer.percent(),
            mysql_buffer_formatted: s.mysql_buffer.formatted(),
            posts: s.counts.posts,
            pages: s.counts.pages,
            users: s.counts.users,
            top_processes: s.top_processes.clone(),
        }
    }
}
