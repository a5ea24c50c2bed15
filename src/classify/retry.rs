//! Retry with exponential backoff for throttled classification calls

use std::time::Duration;

use rand::Rng;

/// Retry policy for throttled classification calls
///
/// Controls how many times a throttled request is retried and how long to
/// wait between attempts using exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the initial call
    pub max_retries: u32,
    /// Base delay between retries (doubles each attempt)
    pub base_delay: Duration,
    /// Upper bound of the uniform jitter added to each delay
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(3000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Compute the delay before retry `attempt` (0-based):
    /// `base_delay * 2^attempt` plus a uniform jitter in `[0, max_jitter)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = rand::thread_rng().gen_range(0.0..1.0);

        base + self.max_jitter.mul_f64(jitter)
    }
}

/// Whether an HTTP status and response body signal throttling.
///
/// Covers a literal 429 and the "resource exhausted" wording some
/// generative-AI backends return instead.
#[must_use]
pub fn is_throttle_signal(status: u16, body: &str) -> bool {
    status == 429 || body.contains("RESOURCE_EXHAUSTED")
}
