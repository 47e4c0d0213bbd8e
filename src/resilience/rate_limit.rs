//! Outbound rate limiting.
//!
//! A sliding-window limiter: the instants of the last `quota` admissions are
//! kept, and a caller is admitted only once the oldest of them has left the
//! one-second window. Waiters queue on a FIFO async mutex, so callers are
//! served in arrival order and none can starve.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

const WINDOW: Duration = Duration::from_secs(1);

/// Shared limiter admitting at most `quota` calls per rolling second.
#[derive(Debug)]
pub struct RateLimiter {
    quota: usize,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_second` admissions per rolling
    /// second. A quota of zero is treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        let quota = requests_per_second.max(1) as usize;
        Self {
            quota,
            admitted: Mutex::new(VecDeque::with_capacity(quota)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second)
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Wait until a token is available and consume it.
    ///
    /// Never fails and never drops the caller; it only delays.
    pub async fn acquire(&self) {
        if let Some(waited) = self.admit().await {
            tracing::debug!(waited_ms = waited.as_millis() as u64, "Rate limit delayed request");
        }
    }

    /// Admit one caller. Returns the time spent waiting if the window was full.
    async fn admit(&self) -> Option<Duration> {
        let start = Instant::now();
        let mut admitted = self.admitted.lock().await;
        let mut slept = false;

        loop {
            let now = Instant::now();
            prune(&mut admitted, now);

            if admitted.len() < self.quota {
                admitted.push_back(now);
                break;
            }

            // Full window: the oldest admission decides when the next slot opens.
            // The lock stays held so later arrivals queue behind this caller.
            if let Some(&oldest) = admitted.front() {
                sleep_until(oldest + WINDOW).await;
                slept = true;
            }
        }

        let waited = start.elapsed();
        metrics::record_rate_limit_wait(waited);
        slept.then_some(waited)
    }

    /// Consume a token if one is available right now.
    ///
    /// Returns false without waiting when the window is full or another caller
    /// is currently queued for a token.
    pub fn try_acquire(&self) -> bool {
        let Ok(mut admitted) = self.admitted.try_lock() else {
            return false;
        };
        let now = Instant::now();
        prune(&mut admitted, now);

        if admitted.len() < self.quota {
            admitted.push_back(now);
            true
        } else {
            false
        }
    }

    /// Tokens still available in the current window, if not contended.
    pub fn available(&self) -> Option<usize> {
        let mut admitted = self.admitted.try_lock().ok()?;
        prune(&mut admitted, Instant::now());
        Some(self.quota - admitted.len())
    }
}

fn prune(admitted: &mut VecDeque<Instant>, now: Instant) {
    while let Some(&oldest) = admitted.front() {
        if now.duration_since(oldest) >= WINDOW {
            admitted.pop_front();
        } else {
            break;
        }
    }
}
