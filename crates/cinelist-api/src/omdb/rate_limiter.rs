//! OMDb request pacing.

use std::time::{Duration, Instant};

/// Default minimum gap between requests.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Keeps a minimum gap between consecutive OMDb requests.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbRateLimiter {
    /// Minimum gap between requests.
    min_interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
}

impl OmdbRateLimiter {
    /// Creates a limiter with the given minimum gap.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: None,
        }
    }

    /// Creates a limiter with the default gap (100ms).
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Sleeps until the next slot, then reserves the following one.
    pub async fn acquire(&mut self) {
        if let Some(slot) = self.next_slot {
            let now = Instant::now();
            if slot > now {
                tokio::time::sleep(slot.saturating_duration_since(now)).await;
            }
        }

        self.next_slot = Instant::now().checked_add(self.min_interval);
    }
}
