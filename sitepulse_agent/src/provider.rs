//! Ordered provider chains: each metric lists its sources from most to least
//! authoritative and the chain returns the first one that produces a value.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("unparseable source output: {0}")]
    Parse(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

/// Inputs every provider may consult during one resolution cycle.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    pub settings: Settings,
    /// Configured application memory ceiling; `None` when unknown or unlimited.
    pub memory_limit_mb: Option<f64>,
}

#[async_trait]
pub trait Provider<T>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap capability probe. A provider that is not available is skipped
    /// without calling [`Provider::read`].
    async fn available(&self, _ctx: &ResolveContext) -> bool {
        true
    }

    async fn read(&self, ctx: &ResolveContext) -> Result<T, ProbeError>;
}

pub struct ProviderChain<T> {
    metric: &'static str,
    providers: Vec<Box<dyn Provider<T>>>,
    fallback: Box<dyn Fn(&ResolveContext) -> T + Send + Sync>,
}

impl<T: Send> ProviderChain<T> {
    pub fn new(
        metric: &'static str,
        fallback: impl Fn(&ResolveContext) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            metric,
            providers: Vec::new(),
            fallback: Box::new(fallback),
        }
    }

    pub fn with(mut self, p: impl Provider<T> + 'static) -> Self {
        self.providers.push(Box::new(p));
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Walk the chain; failures fall through to the next provider and finally
    /// to the terminal fallback. Never returns an error.
    pub async fn resolve(&self, ctx: &ResolveContext) -> T {
        for p in &self.providers {
            if !p.available(ctx).await {
                debug!(metric = self.metric, provider = p.name(), "provider not available");
                continue;
            }
            match p.read(ctx).await {
                Ok(v) => return v,
                Err(e) => {
                    debug!(metric = self.metric, provider = p.name(), error = %e, "provider failed");
                }
            }
        }
        debug!(metric = self.metric, "using fallback value");
        (self.fallback)(ctx)
    }
}
