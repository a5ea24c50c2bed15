//! Minimum-interval spacing for outbound classification calls
//!
//! The shared state is a single scalar: the timestamp of the last outbound
//! call, read before write. Every classification request waits its turn here
//! before its first attempt, so no two calls leave the client less than the
//! configured interval apart no matter how many utterances are queued.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Minimum spacing between outbound classification calls
pub const MIN_CALL_INTERVAL: Duration = Duration::from_millis(2000);

/// Process-wide spacer for outbound classification calls
#[derive(Debug)]
pub struct CallSpacer {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Default for CallSpacer {
    fn default() -> Self {
        Self::new(MIN_CALL_INTERVAL)
    }
}

impl CallSpacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// How long a new request would wait right now, if at all.
    ///
    /// Advisory only — another request may claim the slot first.
    #[must_use]
    pub fn pending_wait(&self) -> Option<Duration> {
        let last = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        last.and_then(|t| self.interval.checked_sub(t.elapsed()))
            .filter(|d| !d.is_zero())
    }

    /// Wait until the interval since the last call has elapsed, then claim
    /// the slot. Checking and stamping happen under one lock, so concurrent
    /// requests serialize: each sleeps and re-checks until it wins the slot.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut last = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
                let now = Instant::now();
                match last.and_then(|t| self.interval.checked_sub(now.duration_since(t))) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => {
                        *last = Some(now);
                        return;
                    }
                }
            };

            tokio::time::sleep(wait).await;
        }
    }

    /// Stamp the last-call scalar without waiting. Used by retry attempts of
    /// a request that already waited out its spacing.
    pub fn record(&self) {
        let mut last = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Instant::now());
    }
}
