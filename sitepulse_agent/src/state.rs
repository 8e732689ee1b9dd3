//! Shared agent state: resolver, snapshot cache, settings and session nonces.

use std::sync::Arc;
use tokio::time::Duration;

use crate::cache::SnapshotCache;
use crate::config::AgentConfig;
use crate::db::{MySqlDatabase, SharedDatabase};
use crate::metrics::SourceResolver;
use crate::provider::{ProbeError, ResolveContext};
use crate::session::NonceStore;
use crate::settings::SettingsStore;
use crate::types::MetricSnapshot;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SourceResolver>,
    pub cache: Arc<SnapshotCache>,
    pub settings: Arc<SettingsStore>,
    pub nonces: Arc<NonceStore>,
    pub auth_token: Option<String>,
    pub memory_limit_mb: Option<f64>,
}

impl AppState {
    pub fn from_config(cfg: &AgentConfig) -> Result<Self, ProbeError> {
        let db: Option<SharedDatabase> = match cfg.db_url.as_deref() {
            Some(url) => Some(Arc::new(MySqlDatabase::connect_lazy(url)?)),
            None => None,
        };
        let resolver = SourceResolver::new(cfg.app_root.clone(), db, &cfg.table_prefix);
        Ok(Self {
            resolver: Arc::new(resolver),
            cache: Arc::new(SnapshotCache::new()),
            settings: Arc::new(SettingsStore::load(cfg.settings_path.clone())),
            nonces: Arc::new(NonceStore::default()),
            auth_token: cfg.admin_token.clone(),
            memory_limit_mb: cfg.memory_limit_mb,
        })
    }

    /// Administrative capability check for the authenticated endpoints.
    pub fn is_admin(&self, bearer: Option<&str>) -> bool {
        match (self.auth_token.as_deref(), bearer) {
            (Some(expected), Some(given)) => tokens_match(expected.as_bytes(), given.as_bytes()),
            _ => false,
        }
    }

    /// Cached snapshot, resolved at most once per TTL window.
    pub async fn snapshot(&self) -> Arc<MetricSnapshot> {
        let settings = self.settings.current().await;
        let ttl = Duration::from_secs(settings.cache_ttl_s.max(1));
        let ctx = ResolveContext {
            settings,
            memory_limit_mb: self.memory_limit_mb,
        };
        self.cache
            .get_or_resolve(ttl, || self.resolver.resolve(&ctx))
            .await
    }
}

/// Byte comparison whose running time depends only on the lengths.
pub fn tokens_match(expected: &[u8], given: &[u8]) -> bool {
    if expected.len() != given.len() {
        return false;
    }
    expected
        .iter()
        .zip(given)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::tokens_match;

    #[test]
    fn token_comparison() {
        assert!(tokens_match(b"s3cret", b"s3cret"));
        assert!(!tokens_match(b"s3cret", b"s3creT"));
        assert!(!tokens_match(b"s3cret", b"s3cre"));
        assert!(!tokens_match(b"s3cret", b""));
    }
}
