//! Three-tier alert classification for the cpu/ram/disk badges.

use crate::types::{AlertThresholds, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    Ok,
    Warn,
    Crit,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Crit => "CRIT",
        }
    }
}

/// `Crit` at or above `max(95, threshold + 10)`, `Warn` at or above the
/// threshold, otherwise `Ok`.
pub fn classify(value: f64, threshold: u8) -> Severity {
    let t = f64::from(threshold);
    if value >= (t + 10.0).max(95.0) {
        Severity::Crit
    } else if value >= t {
        Severity::Warn
    } else {
        Severity::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertBoard {
    pub cpu: Severity,
    pub ram: Severity,
    pub disk: Severity,
}

impl AlertBoard {
    pub fn evaluate(stats: &Stats, t: &AlertThresholds) -> Self {
        Self {
            cpu: classify(stats.cpu, t.cpu),
            ram: classify(stats.ram_percent, t.ram),
            disk: classify(stats.disk_percent, t.disk),
        }
    }

    pub fn worst(&self) -> Severity {
        self.cpu.max(self.ram).max(self.disk)
    }
}
