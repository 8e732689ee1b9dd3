//! Snapshot cache TTL and single-flight behaviour on a paused clock.
use sitepulse_agent::cache::SnapshotCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{advance, sleep, Duration};

const TTL: Duration = Duration::from_secs(2);

async fn counted(counter: &AtomicUsize) -> usize {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

#[tokio::test(start_paused = true)]
async fn reads_within_ttl_share_one_snapshot() {
    let cache: SnapshotCache<usize> = SnapshotCache::new();
    let calls = AtomicUsize::new(0);

    let a = cache.get_or_resolve(TTL, || counted(&calls)).await;
    advance(Duration::from_millis(1500)).await;
    let b = cache.get_or_resolve(TTL, || counted(&calls)).await;

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn expiry_triggers_a_fresh_resolution() {
    let cache: SnapshotCache<usize> = SnapshotCache::new();
    let calls = AtomicUsize::new(0);

    let first = cache.get_or_resolve(TTL, || counted(&calls)).await;
    let first_at = cache.created_at().await.unwrap();

    // exactly at created_at + ttl the entry is already stale
    advance(TTL).await;
    let second = cache.get_or_resolve(TTL, || counted(&calls)).await;
    let second_at = cache.created_at().await.unwrap();

    assert_eq!((*first, *second), (1, 2));
    assert!(second_at > first_at);
}

#[tokio::test(start_paused = true)]
async fn invalidate_forces_resolution() {
    let cache: SnapshotCache<usize> = SnapshotCache::new();
    let calls = AtomicUsize::new(0);

    cache.get_or_resolve(TTL, || counted(&calls)).await;
    cache.invalidate().await;
    assert!(cache.created_at().await.is_none());
    let v = cache.get_or_resolve(TTL, || counted(&calls)).await;
    assert_eq!(*v, 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_resolution() {
    let cache: Arc<SnapshotCache<usize>> = Arc::new(SnapshotCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let slow = |cache: Arc<SnapshotCache<usize>>, calls: Arc<AtomicUsize>| async move {
        cache
            .get_or_resolve(TTL, || async {
                sleep(Duration::from_millis(500)).await;
                calls.fetch_add(1, Ordering::SeqCst) + 1
            })
            .await
    };

    let (a, b) = futures::future::join(
        slow(cache.clone(), calls.clone()),
        slow(cache.clone(), calls.clone()),
    )
    .await;

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn ttl_beyond_the_clock_range_keeps_serving() {
    let cache: SnapshotCache<usize> = SnapshotCache::new();
    let calls = AtomicUsize::new(0);
    let huge = Duration::from_secs(u64::MAX);

    let a = cache.get_or_resolve(huge, || counted(&calls)).await;
    advance(Duration::from_secs(3600)).await;
    let b = cache.get_or_resolve(huge, || counted(&calls)).await;

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
