//! Persisted dashboard settings: JSON file under the XDG config dir
//! ($XDG_CONFIG_HOME/sitepulse_agent/settings.json, fallback ~/.config/sitepulse_agent/).
//!
//! Every write goes through [`normalize`], and so does every read: the file is
//! parsed as a loose JSON object and folded onto the defaults, so missing or
//! malformed keys never surface as errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Raw settings write: any JSON object, keys optional, values loosely typed.
pub type SettingsInput = Map<String, Value>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

// Loose integer coercion: numbers truncate, numeric strings parse, anything else is 0.
fn as_int(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Upper bound for the refresh interval and the cache TTL.
pub const MAX_INTERVAL_S: u64 = 3600;

fn clamp_secs(v: &Value) -> u64 {
    as_int(v).clamp(1, MAX_INTERVAL_S as i64) as u64
}

fn clamp_pct(v: &Value) -> u8 {
    as_int(v).clamp(1, 100) as u8
}

fn chart_type(v: &Value) -> ChartType {
    match v.as_str().map(str::trim) {
        Some("bar") => ChartType::Bar,
        _ => ChartType::Line,
    }
}

/// Fold a loosely-typed input object onto `current`. Keys that are absent keep
/// their current value; present keys are clamped or defaulted, never rejected.
pub fn normalize(current: &Settings, input: &SettingsInput) -> Settings {
    let mut out = current.clone();
    if let Some(v) = input.get("refresh_interval_s") {
        out.refresh_interval_s = clamp_secs(v);
    }
    if let Some(v) = input.get("cache_ttl_s") {
        out.cache_ttl_s = clamp_secs(v);
    }
    if let Some(v) = input.get("use_real_metrics") {
        out.use_real_metrics = truthy(v);
    }
    if let Some(v) = input.get("chart_type") {
        out.chart_type = chart_type(v);
    }
    if let Some(v) = input.get("dark_mode") {
        out.dark_mode = truthy(v);
    }
    if let Some(Value::Object(t)) = input.get("alert_thresholds") {
        if let Some(v) = t.get("cpu") {
            out.alert_thresholds.cpu = clamp_pct(v);
        }
        if let Some(v) = t.get("ram") {
            out.alert_thresholds.ram = clamp_pct(v);
        }
        if let Some(v) = t.get("disk") {
            out.alert_thresholds.disk = clamp_pct(v);
        }
    }
    out
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sitepulse_agent")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitepulse_agent")
    }
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Read the file (if any) and merge it against the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = read_merged(&path);
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn current(&self) -> Settings {
        self.current.read().await.clone()
    }

    /// Normalize `input` against the current settings and persist the result.
    pub async fn update(&self, input: &Value) -> Result<Settings, SettingsError> {
        let empty = SettingsInput::new();
        let obj = input.as_object().unwrap_or(&empty);
        let mut guard = self.current.write().await;
        let next = normalize(&guard, obj);
        write_settings(&self.path, &next)?;
        info!(path = %self.path.display(), ?next, "settings saved");
        *guard = next.clone();
        Ok(next)
    }
}

fn read_merged(path: &Path) -> Settings {
    let defaults = Settings::default();
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return defaults,
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => normalize(&defaults, &map),
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "ignoring unreadable settings file");
            defaults
        }
    }
}

fn write_settings(path: &Path, s: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = serde_json::to_vec_pretty(s)?;
    std::fs::write(path, data).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_integers() {
        assert_eq!(as_int(&json!("42")), 42);
        assert_eq!(as_int(&json!(" 7.9 ")), 7);
        assert_eq!(as_int(&json!("abc")), 0);
        assert_eq!(as_int(&json!(3.7)), 3);
        assert_eq!(as_int(&json!(null)), 0);
    }

    #[test]
    fn truthiness_follows_form_semantics() {
        assert!(!truthy(&json!("0")));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!("1")));
        assert!(truthy(&json!("yes")));
        assert!(truthy(&json!(true)));
    }
}
