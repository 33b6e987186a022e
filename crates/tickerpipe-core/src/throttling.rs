use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between two outbound upstream calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Spacing gate in front of the upstream provider.
///
/// Holds the instant of the last outbound call. Callers queue on a fair mutex,
/// so concurrent requests pass the gate first-come-first-served and each one
/// starts at least `min_interval` after the previous one. The upstream call
/// itself happens after [`RateLimiter::acquire`] returns, outside the lock.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the spacing window has passed, then claim the slot.
    ///
    /// Returns how long the caller was made to sleep.
    pub async fn acquire(&self) -> Duration {
        let mut last_call = self.last_call.lock().await;

        let wait = last_call
            .map(|previous| self.min_interval.saturating_sub(previous.elapsed()))
            .unwrap_or(Duration::ZERO);

        if !wait.is_zero() {
            tracing::info!(
                sleep_ms = wait.as_millis() as u64,
                "rate limiting: sleeping before upstream call"
            );
            tokio::time::sleep(wait).await;
        }

        *last_call = Some(Instant::now());
        wait
    }

    /// Claim the slot only if it is free right now.
    ///
    /// Never sleeps and never queues: returns `false` while another caller
    /// holds the gate or the spacing window has not passed yet.
    pub fn try_acquire(&self) -> bool {
        let Ok(mut last_call) = self.last_call.try_lock() else {
            return false;
        };

        let ready = last_call.map_or(true, |previous| previous.elapsed() >= self.min_interval);
        if ready {
            *last_call = Some(Instant::now());
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_call_passes_immediately() {
        let limiter = RateLimiter::new(Duration::from_millis(200));

        let waited = limiter.acquire().await;

        assert_eq!(waited, Duration::ZERO);
    }

    #[tokio::test]
    async fn back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(120));

        let started = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn try_acquire_takes_a_free_slot_once() {
        let limiter = RateLimiter::new(Duration::from_millis(200));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn try_acquire_does_not_wait_behind_a_queued_caller() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(150)));
        limiter.acquire().await;

        // The second acquire sleeps while holding the gate.
        let queued = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await })
        };
        tokio::task::yield_now().await;

        let started = Instant::now();
        assert!(!limiter.try_acquire());
        assert!(started.elapsed() < Duration::from_millis(50));

        queued.await.expect("task should not panic");
    }

    #[tokio::test]
    async fn concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(60)));
        let started = Instant::now();

        let handles = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect::<Vec<_>>();

        let mut waits = Vec::new();
        for handle in handles {
            waits.push(handle.await.expect("task should not panic"));
        }
        waits.sort();

        // Three slots 60ms apart: the last one cannot open before 120ms.
        assert!(started.elapsed() >= Duration::from_millis(120));
        assert_eq!(waits[0], Duration::ZERO);
        assert!(waits[2] > Duration::ZERO);
    }
}
