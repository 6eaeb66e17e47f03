//! The background worker that discovers open orders, polls the accrual service, and
//! applies results back to the Store.
pub mod client;

pub use client::AccrualClient;

use crate::store::Store;
use client::PollOutcome;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// A single wall-clock gate shared across ticks, not a per-order backoff: once a 429 is seen,
/// every tick checks this before issuing any requests, and skips entirely until the instant has
/// passed. Written only from within the poller.
struct Cooldown(Mutex<Option<Instant>>);

impl Cooldown {
    fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn active(&self) -> bool {
        matches!(*self.0.lock().unwrap(), Some(until) if Instant::now() < until)
    }

    fn engage(&self, for_: Duration) {
        let until = Instant::now() + for_;
        let mut guard = self.0.lock().unwrap();
        if guard.map_or(true, |existing| until > existing) {
            *guard = Some(until);
        }
    }
}

/// Runs the ticker loop until `shutdown` is notified. Each tick lists open orders, fans out one
/// concurrent request per order, and joins the whole fan-out before the next tick starts -- so
/// at most one tick's worth of requests is ever in flight. The shutdown check only happens
/// between ticks, so a tick already fanning out requests is allowed to finish rather than being
/// torn down mid-flight.
pub async fn run_poller(
    store: Store,
    client: Arc<AccrualClient>,
    interval: Duration,
    shutdown: Arc<Notify>,
) {
    let cooldown = Cooldown::new();
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.notified() => {
                tracing::info!("accrual poller shutting down");
                return;
            }
        }
        if cooldown.active() {
            continue;
        }
        let numbers = match store.list_open_orders().await {
            Ok(numbers) => numbers,
            Err(err) => {
                tracing::warn!(?err, "listing open orders failed");
                continue;
            }
        };
        if numbers.is_empty() {
            continue;
        }
        let outcomes = join_all(numbers.iter().map(|number| client.poll(number))).await;
        for (number, outcome) in numbers.iter().zip(outcomes) {
            match outcome {
                Ok(PollOutcome::Applied { status, accrual }) => {
                    if let Err(err) = store.apply_accrual(number, status, accrual).await {
                        tracing::warn!(%number, ?err, "applying accrual result failed, will retry");
                    }
                }
                Ok(PollOutcome::RateLimited { retry_after }) => {
                    tracing::info!(?retry_after, "accrual service rate-limited us, cooling down");
                    cooldown.engage(retry_after);
                    break;
                }
                Ok(PollOutcome::Skipped) => {}
                Err(_) => {
                    // already logged at the appropriate level inside `AccrualClient::poll`
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_is_inactive_until_engaged() {
        let cooldown = Cooldown::new();
        assert!(!cooldown.active());
    }

    #[test]
    fn cooldown_blocks_for_the_engaged_duration() {
        let cooldown = Cooldown::new();
        cooldown.engage(Duration::from_millis(50));
        assert!(cooldown.active());
        std::thread::sleep(Duration::from_millis(80));
        assert!(!cooldown.active());
    }

    #[test]
    fn engaging_a_shorter_cooldown_does_not_shorten_an_active_one() {
        let cooldown = Cooldown::new();
        cooldown.engage(Duration::from_millis(200));
        cooldown.engage(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(50));
        assert!(cooldown.active());
    }
}
