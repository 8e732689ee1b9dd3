//! Ordered fall-through of provider chains.
use async_trait::async_trait;
use sitepulse_agent::provider::{ProbeError, Provider, ProviderChain, ResolveContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Fixed {
    name: &'static str,
    available: bool,
    value: Result<u32, ()>,
    reads: Arc<AtomicUsize>,
}

impl Fixed {
    fn new(name: &'static str, available: bool, value: Result<u32, ()>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name,
                available,
                value,
                reads: reads.clone(),
            },
            reads,
        )
    }
}

#[async_trait]
impl Provider<u32> for Fixed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn available(&self, _ctx: &ResolveContext) -> bool {
        self.available
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<u32, ProbeError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.value
            .map_err(|_| ProbeError::Unavailable(format!("{} failed", self.name)))
    }
}

#[tokio::test]
async fn first_successful_provider_wins() {
    let (a, a_reads) = Fixed::new("a", true, Ok(1));
    let (b, b_reads) = Fixed::new("b", true, Ok(2));
    let chain = ProviderChain::new("test", |_| 99).with(a).with(b);

    assert_eq!(chain.resolve(&ResolveContext::default()).await, 1);
    assert_eq!(a_reads.load(Ordering::SeqCst), 1);
    assert_eq!(b_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_providers_are_never_read() {
    let (a, a_reads) = Fixed::new("a", false, Ok(1));
    let (b, _) = Fixed::new("b", true, Ok(2));
    let chain = ProviderChain::new("test", |_| 99).with(a).with(b);

    assert_eq!(chain.resolve(&ResolveContext::default()).await, 2);
    assert_eq!(a_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failures_fall_through_to_the_fallback() {
    let (a, a_reads) = Fixed::new("a", true, Err(()));
    let (b, b_reads) = Fixed::new("b", true, Err(()));
    let chain = ProviderChain::new("test", |_| 99).with(a).with(b);

    assert_eq!(chain.provider_names(), vec!["a", "b"]);
    assert_eq!(chain.resolve(&ResolveContext::default()).await, 99);
    assert_eq!(a_reads.load(Ordering::SeqCst), 1);
    assert_eq!(b_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fallback_sees_the_context() {
    let chain: ProviderChain<u32> = ProviderChain::new("test", |ctx: &ResolveContext| {
        if ctx.settings.use_real_metrics {
            1
        } else {
            0
        }
    });
    let mut ctx = ResolveContext::default();
    assert_eq!(chain.resolve(&ctx).await, 0);
    ctx.settings.use_real_metrics = true;
    assert_eq!(chain.resolve(&ctx).await, 1);
}
