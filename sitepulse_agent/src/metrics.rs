//! Source resolution: one provider chain per metric, assembled into a
//! [`MetricSnapshot`] per cycle.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use sysinfo::{Disks, System};
use tokio::sync::Mutex;

use crate::db::{buffer_pool_chain, db_size_chain, read_counts, SharedDatabase};
use crate::host::{
    cpu_chain, disk_chain, load_chain, process_memory_mb, ram_chain, simulated_net,
    top_processes, uptime_chain, SharedSystem,
};
use crate::provider::{ProviderChain, ResolveContext};
use crate::types::{BufferPool, DiskUsage, MetricSnapshot, RamUsage};

const TOP_PROCESSES: usize = 5;

pub struct SourceResolver {
    sys: SharedSystem,
    cpu: ProviderChain<f64>,
    load: ProviderChain<Option<[f64; 3]>>,
    ram: ProviderChain<RamUsage>,
    disk: ProviderChain<DiskUsage>,
    uptime: ProviderChain<String>,
    db_size: ProviderChain<f64>,
    buffer: ProviderChain<BufferPool>,
    db: Option<SharedDatabase>,
    table_prefix: String,
}

impl SourceResolver {
    pub fn new(app_root: PathBuf, db: Option<SharedDatabase>, table_prefix: &str) -> Self {
        let sys: SharedSystem = Arc::new(Mutex::new(System::new()));
        let disks = Arc::new(Mutex::new(Disks::new_with_refreshed_list()));
        Self {
            cpu: cpu_chain(),
            load: load_chain(),
            ram: ram_chain(sys.clone()),
            disk: disk_chain(app_root, disks),
            uptime: uptime_chain(),
            db_size: db_size_chain(db.clone(), table_prefix),
            buffer: buffer_pool_chain(db.clone()),
            db,
            table_prefix: table_prefix.to_string(),
            sys,
        }
    }

    /// Resolve every metric. Individual sources may fail; the snapshot is
    /// always complete.
    pub async fn resolve(&self, ctx: &ResolveContext) -> MetricSnapshot {
        let cpu_percent = self.cpu.resolve(ctx).await;
        let load_avg = self.load.resolve(ctx).await;
        let ram = clamp_ram(self.ram.resolve(ctx).await);
        let disk = self.disk.resolve(ctx).await;
        let uptime = self.uptime.resolve(ctx).await;
        let db_size_mb = self.db_size.resolve(ctx).await.max(0.0);
        let mysql_buffer = self.buffer.resolve(ctx).await;
        let counts = read_counts(self.db.as_deref(), &self.table_prefix).await;
        let process_memory_mb = process_memory_mb(&self.sys).await.unwrap_or(0.0);
        let top_processes = top_processes(&self.sys, TOP_PROCESSES).await;

        MetricSnapshot {
            generated_at: Utc::now(),
            cpu_percent: cpu_percent.clamp(0.0, 100.0),
            load_avg,
            ram,
            process_memory_mb,
            disk,
            net: simulated_net(ctx),
            uptime,
            db_size_mb,
            mysql_buffer,
            counts,
            top_processes,
        }
    }
}

/// `used_mb <= total_mb` and `0 <= percent <= 100` for every snapshot.
pub fn clamp_ram(r: RamUsage) -> RamUsage {
    RamUsage {
        used_mb: r.used_mb.max(0.0).min(r.total_mb.max(0.0)),
        total_mb: r.total_mb.max(0.0),
        percent: r.percent.clamp(0.0, 100.0),
    }
}
