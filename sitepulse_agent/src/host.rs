//! Host and process probes: /proc files, small external commands, and sysinfo.
//!
//! Paths are fields rather than constants so the Linux readers can be pointed
//! at fixture files.

use async_trait::async_trait;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use sysinfo::{Disks, ProcessesToUpdate, System};
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::provider::{ProbeError, Provider, ProviderChain, ResolveContext};
use crate::types::{DiskUsage, NetRates, ProcessInfo, RamUsage};

pub type SharedSystem = Arc<Mutex<System>>;
pub type SharedDisks = Arc<Mutex<Disks>>;

const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn round_to(v: f64, dp: i32) -> f64 {
    let f = 10f64.powi(dp);
    (v * f).round() / f
}

pub fn random_in(lo: u32, hi: u32) -> f64 {
    f64::from(rand::thread_rng().gen_range(lo..=hi))
}

async fn run_command(program: &str, args: &[&str]) -> Result<String, ProbeError> {
    let out = Command::new(program).args(args).output().await?;
    if !out.status.success() {
        return Err(ProbeError::Unavailable(format!("{program} exited with {}", out.status)));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

// ---------- CPU / load ----------

/// 1/5/15-minute load average. sysinfo reports zeros where the OS has no
/// load-average facility, so only Unix counts as available.
pub struct LoadAverage;

#[async_trait]
impl Provider<Option<[f64; 3]>> for LoadAverage {
    fn name(&self) -> &'static str {
        "loadavg"
    }

    async fn available(&self, _ctx: &ResolveContext) -> bool {
        cfg!(unix)
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<Option<[f64; 3]>, ProbeError> {
        let l = System::load_average();
        Ok(Some([l.one, l.five, l.fifteen]))
    }
}

pub fn load_chain() -> ProviderChain<Option<[f64; 3]>> {
    ProviderChain::new("load_avg", |_| None).with(LoadAverage)
}

pub fn count_processors(cpuinfo: &str) -> usize {
    cpuinfo
        .lines()
        .filter(|l| l.starts_with("processor"))
        .count()
}

pub struct CpuInfoCores {
    pub path: PathBuf,
}

impl Default for CpuInfoCores {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/proc/cpuinfo"),
        }
    }
}

#[async_trait]
impl Provider<u32> for CpuInfoCores {
    fn name(&self) -> &'static str {
        "cpuinfo"
    }

    async fn available(&self, _ctx: &ResolveContext) -> bool {
        self.path.is_file()
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<u32, ProbeError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        match count_processors(&text) {
            0 => Err(ProbeError::Parse("no processor entries".into())),
            n => Ok(n as u32),
        }
    }
}

/// `nproc`. Output that does not parse counts as 0 cores, i.e. unknown.
pub struct NprocCores;

#[async_trait]
impl Provider<u32> for NprocCores {
    fn name(&self) -> &'static str {
        "nproc"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<u32, ProbeError> {
        let out = run_command("nproc", &[]).await?;
        Ok(out.parse().unwrap_or(0))
    }
}

pub fn core_chain() -> ProviderChain<u32> {
    ProviderChain::new("cpu_cores", |_| 1)
        .with(CpuInfoCores::default())
        .with(NprocCores)
}

/// Host load as a percentage of capacity: the 1-minute load over the core
/// count, or `load*10` when the core count is unknown.
pub fn load_percent(load1: f64, cores: u32) -> f64 {
    let pct = if cores > 0 {
        round_to(load1 / f64::from(cores) * 100.0, 1)
    } else {
        round_to(load1 * 10.0, 1)
    };
    pct.min(100.0)
}

pub struct LoadPerCore {
    pub cores: ProviderChain<u32>,
}

#[async_trait]
impl Provider<f64> for LoadPerCore {
    fn name(&self) -> &'static str {
        "load_per_core"
    }

    async fn available(&self, _ctx: &ResolveContext) -> bool {
        cfg!(unix)
    }

    async fn read(&self, ctx: &ResolveContext) -> Result<f64, ProbeError> {
        let load1 = System::load_average().one;
        let cores = self.cores.resolve(ctx).await;
        Ok(load_percent(load1, cores))
    }
}

pub fn cpu_chain() -> ProviderChain<f64> {
    ProviderChain::new("cpu", |_| random_in(5, 30)).with(LoadPerCore {
        cores: core_chain(),
    })
}

// ---------- Memory ----------

/// (MemTotal, MemAvailable) in kB.
pub fn parse_meminfo(text: &str) -> Option<(u64, u64)> {
    let field = |key: &str| {
        text.lines()
            .find(|l| l.starts_with(key))
            .and_then(|l| l[key.len()..].split_whitespace().next())
            .and_then(|v| v.parse::<u64>().ok())
    };
    Some((field("MemTotal:")?, field("MemAvailable:")?))
}

pub fn ram_from_kb(total_kb: u64, avail_kb: u64) -> RamUsage {
    let used_kb = total_kb.saturating_sub(avail_kb);
    RamUsage {
        used_mb: round_to(used_kb as f64 / 1024.0, 1),
        total_mb: round_to(total_kb as f64 / 1024.0, 1),
        percent: round_to(used_kb as f64 / total_kb as f64 * 100.0, 1).clamp(0.0, 100.0),
    }
}

/// System memory from /proc/meminfo; only consulted in real-metrics mode.
pub struct MemInfo {
    pub path: PathBuf,
}

impl Default for MemInfo {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/proc/meminfo"),
        }
    }
}

#[async_trait]
impl Provider<RamUsage> for MemInfo {
    fn name(&self) -> &'static str {
        "meminfo"
    }

    async fn available(&self, ctx: &ResolveContext) -> bool {
        ctx.settings.use_real_metrics && self.path.is_file()
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<RamUsage, ProbeError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        match parse_meminfo(&text) {
            Some((total, avail)) if total > 0 && avail > 0 => Ok(ram_from_kb(total, avail)),
            _ => Err(ProbeError::Parse("MemTotal/MemAvailable missing".into())),
        }
    }
}

pub async fn process_memory_mb(sys: &SharedSystem) -> Option<f64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = sys.lock().await;
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid).map(|p| round_to(p.memory() as f64 / MB, 1))
}

/// Pair a process usage figure with a limit, keeping `used <= total`.
/// With no known limit the percent is synthetic and the total is derived from
/// it so the pair stays consistent.
pub fn process_ram(used_mb: f64, limit_mb: Option<f64>) -> RamUsage {
    match limit_mb {
        Some(limit) if limit > 0.0 => {
            let used = used_mb.min(limit);
            RamUsage {
                used_mb: used,
                total_mb: limit,
                percent: round_to(used / limit * 100.0, 1).clamp(0.0, 100.0),
            }
        }
        _ => {
            let percent = random_in(20, 70);
            RamUsage {
                used_mb,
                total_mb: round_to(used_mb * 100.0 / percent, 1).max(used_mb),
                percent,
            }
        }
    }
}

/// Agent process memory against the configured application memory limit.
pub struct ProcessMemory {
    pub sys: SharedSystem,
}

#[async_trait]
impl Provider<RamUsage> for ProcessMemory {
    fn name(&self) -> &'static str {
        "process_memory"
    }

    async fn read(&self, ctx: &ResolveContext) -> Result<RamUsage, ProbeError> {
        let used = process_memory_mb(&self.sys)
            .await
            .ok_or_else(|| ProbeError::Unavailable("current process not listed".into()))?;
        Ok(process_ram(used, ctx.memory_limit_mb))
    }
}

pub fn ram_chain(sys: SharedSystem) -> ProviderChain<RamUsage> {
    ProviderChain::new("ram", |_| RamUsage {
        used_mb: 0.0,
        total_mb: 0.0,
        percent: random_in(20, 70),
    })
    .with(MemInfo::default())
    .with(ProcessMemory { sys })
}

// ---------- Disk ----------

/// Space on the filesystem holding the application root: the mounted disk
/// whose mount point is the longest prefix of the root path.
pub struct DiskSpace {
    pub root: PathBuf,
    pub disks: SharedDisks,
}

pub fn disk_from_bytes(total: u64, free: u64) -> DiskUsage {
    DiskUsage {
        percent: round_to(total.saturating_sub(free) as f64 / total as f64 * 100.0, 1),
        total_gb: Some(round_to(total as f64 / GB, 2)),
    }
}

#[async_trait]
impl Provider<DiskUsage> for DiskSpace {
    fn name(&self) -> &'static str {
        "disk_space"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<DiskUsage, ProbeError> {
        let root = std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());
        let mut disks = self.disks.lock().await;
        disks.refresh(true);
        let best = disks
            .list()
            .iter()
            .filter(|d| root.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().components().count())
            .ok_or_else(|| ProbeError::Unavailable(format!("no disk mounted for {}", root.display())))?;
        let total = best.total_space();
        if total == 0 {
            return Err(ProbeError::Unavailable("disk reports zero size".into()));
        }
        Ok(disk_from_bytes(total, best.available_space()))
    }
}

pub fn disk_chain(root: PathBuf, disks: SharedDisks) -> ProviderChain<DiskUsage> {
    ProviderChain::new("disk", |_| DiskUsage {
        percent: random_in(10, 60),
        total_gb: None,
    })
    .with(DiskSpace { root, disks })
}

// ---------- Uptime ----------

pub fn seconds_to_human(secs: u64) -> String {
    let d = secs / 86_400;
    let h = secs % 86_400 / 3_600;
    let m = secs % 3_600 / 60;
    let s = secs % 60;
    let mut parts = Vec::new();
    if d > 0 {
        parts.push(format!("{d}d"));
    }
    if h > 0 {
        parts.push(format!("{h}h"));
    }
    if m > 0 {
        parts.push(format!("{m}m"));
    }
    if parts.is_empty() {
        parts.push(format!("{s}s"));
    }
    parts.join(" ")
}

pub struct UptimeCommand;

#[async_trait]
impl Provider<String> for UptimeCommand {
    fn name(&self) -> &'static str {
        "uptime -p"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<String, ProbeError> {
        let out = run_command("uptime", &["-p"]).await?;
        if out.is_empty() {
            return Err(ProbeError::Parse("empty uptime output".into()));
        }
        Ok(out)
    }
}

pub struct ProcUptime {
    pub path: PathBuf,
}

impl Default for ProcUptime {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/proc/uptime"),
        }
    }
}

pub fn parse_proc_uptime(text: &str) -> Option<u64> {
    let secs: f64 = text.split_whitespace().next()?.parse().ok()?;
    Some(secs.floor() as u64)
}

#[async_trait]
impl Provider<String> for ProcUptime {
    fn name(&self) -> &'static str {
        "proc_uptime"
    }

    async fn available(&self, _ctx: &ResolveContext) -> bool {
        self.path.is_file()
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<String, ProbeError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        parse_proc_uptime(&text)
            .map(seconds_to_human)
            .ok_or_else(|| ProbeError::Parse(self.path.display().to_string()))
    }
}

pub struct SysinfoUptime;

#[async_trait]
impl Provider<String> for SysinfoUptime {
    fn name(&self) -> &'static str {
        "sysinfo_uptime"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<String, ProbeError> {
        match System::uptime() {
            0 => Err(ProbeError::Unavailable("uptime not reported".into())),
            secs => Ok(seconds_to_human(secs)),
        }
    }
}

pub fn uptime_chain() -> ProviderChain<String> {
    ProviderChain::new("uptime", |_| "N/A".to_string())
        .with(UptimeCommand)
        .with(ProcUptime::default())
        .with(SysinfoUptime)
}

// ---------- Network / processes ----------

/// Placeholder throughput; there is no real network probe.
pub fn simulated_net(ctx: &ResolveContext) -> NetRates {
    let lo = u32::from(ctx.settings.use_real_metrics);
    NetRates {
        up_mbps: random_in(lo, 40),
        down_mbps: random_in(lo, 120),
    }
}

/// Heaviest processes by resident memory.
pub async fn top_processes(sys: &SharedSystem, limit: usize) -> Vec<ProcessInfo> {
    let mut sys = sys.lock().await;
    sys.refresh_memory();
    sys.refresh_processes(ProcessesToUpdate::All, true);
    let total = sys.total_memory().max(1) as f64;
    let mut procs: Vec<ProcessInfo> = sys
        .processes()
        .values()
        .map(|p| ProcessInfo {
            pid: p.pid().as_u32(),
            name: p.name().to_string_lossy().into_owned(),
            mem_percent: round_to(p.memory() as f64 / total * 100.0, 1) as f32,
            cpu_percent: p.cpu_usage(),
        })
        .collect();
    procs.sort_by(|a, b| b.mem_percent.total_cmp(&a.mem_percent));
    procs.truncate(limit);
    procs
}
