//! Poll timer: one fetch per tick, results handed to the UI over a channel.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use crate::transport::FallbackTransport;
use crate::types::Stats;

pub const MIN_INTERVAL: Duration = Duration::from_millis(1000);

pub fn poll_interval(refresh_s: u64) -> Duration {
    Duration::from_millis(refresh_s.saturating_mul(1000)).max(MIN_INTERVAL)
}

pub struct PollScheduler {
    transport: FallbackTransport,
    period: Duration,
}

impl PollScheduler {
    pub fn new(transport: FallbackTransport, refresh_s: u64) -> Self {
        Self {
            transport,
            period: poll_interval(refresh_s),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fetch immediately, then once per period until the receiver goes away.
    /// A tick waits for its own fetch, so a slow agent stretches the cycle
    /// instead of stacking requests.
    pub async fn run(mut self, tx: mpsc::Sender<Stats>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(stats) = self.transport.fetch_snapshot().await else {
                continue;
            };
            if tx.send(stats).await.is_err() {
                debug!("dashboard closed; stopping poller");
                break;
            }
        }
    }

    pub fn spawn(self, tx: mpsc::Sender<Stats>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }
}
