//! Duration classification
//!
//! Owns the full life of one classification request: minimum-interval
//! spacing, the remote call, bounded exponential-backoff retry on
//! throttling, and the success side effects (speech output, history
//! update). Requests are fire-and-forget tasks; the frame loop never waits
//! on one, and a request's errors never escape it.

mod mapping;
mod provider;
mod retry;
mod spacing;

pub use mapping::{DurationRange, NO_MATCH_SENTENCE, SentenceMap};
pub use provider::{ClassificationResult, RemoteClassifier, SentenceProvider};
pub use retry::{RetryPolicy, is_throttle_signal};
pub use spacing::{CallSpacer, MIN_CALL_INTERVAL};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::context::SharedContext;
use crate::speech::Speaker;
use crate::telemetry::DisplayState;
use crate::{Error, Result};

/// Classifies finished utterance durations through a remote provider.
///
/// Multiple requests may be in flight concurrently; each carries a monotone
/// sequence number so a slow early request cannot overwrite the display
/// state of a later one.
pub struct DurationClassifier {
    provider: Arc<dyn SentenceProvider>,
    spacer: CallSpacer,
    policy: RetryPolicy,
    display: Arc<DisplayState>,
    context: SharedContext,
    speaker: Option<Arc<dyn Speaker>>,
    next_seq: AtomicU64,
    newest_submitted: AtomicU64,
}

impl DurationClassifier {
    #[must_use]
    pub fn new(
        provider: Arc<dyn SentenceProvider>,
        display: Arc<DisplayState>,
        context: SharedContext,
        speaker: Option<Arc<dyn Speaker>>,
    ) -> Self {
        Self {
            provider,
            spacer: CallSpacer::default(),
            policy: RetryPolicy::default(),
            display,
            context,
            speaker,
            next_seq: AtomicU64::new(1),
            newest_submitted: AtomicU64::new(0),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the call spacer
    #[must_use]
    pub fn with_spacer(mut self, spacer: CallSpacer) -> Self {
        self.spacer = spacer;
        self
    }

    /// Submit a finished utterance for classification, fire-and-forget.
    ///
    /// Returns the task handle; callers on the frame path ignore it.
    pub fn submit(self: &Arc<Self>, duration: Duration) -> JoinHandle<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.newest_submitted.fetch_max(seq, Ordering::SeqCst);
        self.display.begin_request();

        let classifier = Arc::clone(self);
        tokio::spawn(async move {
            classifier.run_request(seq, duration.as_secs_f64()).await;
            classifier.display.end_request();
        })
    }

    /// One-shot classification outside the frame pipeline (diagnostics).
    ///
    /// # Errors
    ///
    /// Returns the request's terminal error, `Error::QuotaExceeded` once
    /// retries are exhausted.
    pub async fn classify(&self, duration_seconds: f64) -> Result<ClassificationResult> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.newest_submitted.fetch_max(seq, Ordering::SeqCst);

        match self.attempt_loop(seq, duration_seconds).await? {
            Some(result) => Ok(result),
            None => Err(Error::Classification("superseded by a newer request".to_string())),
        }
    }

    async fn run_request(&self, seq: u64, duration_seconds: f64) {
        tracing::info!(seq, duration_seconds, "classifying utterance");

        match self.attempt_loop(seq, duration_seconds).await {
            Ok(Some(result)) => {
                self.display.apply_prediction(seq, result.clone());

                if result.is_match() {
                    self.context
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push_message(result.detected_sentence.clone());

                    if let Some(speaker) = &self.speaker {
                        if let Err(e) = speaker.speak(&result.detected_sentence).await {
                            tracing::warn!(error = %e, "speech output failed");
                        }
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(seq, "request abandoned as stale");
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "classification failed");
                self.display.apply_error(seq, e.user_message());
            }
        }
    }

    /// Explicit attempt loop: spacing before the first attempt, exponential
    /// backoff between throttled attempts, staleness check after each
    /// backoff. Returns `Ok(None)` when a newer utterance superseded this
    /// request mid-retry.
    async fn attempt_loop(
        &self,
        seq: u64,
        duration_seconds: f64,
    ) -> Result<Option<ClassificationResult>> {
        let mut attempt: u32 = 0;

        loop {
            if attempt == 0 {
                if let Some(wait) = self.spacer.pending_wait() {
                    self.display.apply_status(
                        seq,
                        Some(format!(
                            "Smoothing requests... waiting {}s",
                            wait.as_secs_f64().ceil()
                        )),
                    );
                }
                self.spacer.acquire().await;
            } else {
                self.spacer.record();
            }

            self.display.apply_status(seq, None);

            match self.provider.classify(duration_seconds).await {
                Ok(result) => return Ok(Some(result)),
                Err(e) if e.is_throttled() => {
                    if attempt >= self.policy.max_retries {
                        return Err(Error::QuotaExceeded);
                    }

                    let delay = self.policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        seq,
                        attempt,
                        delay_ms = delay.as_millis(),
                        "throttled, backing off"
                    );
                    self.display.apply_status(
                        seq,
                        Some(format!(
                            "Rate limit reached. Retrying in {}s...",
                            delay.as_secs_f64().round()
                        )),
                    );

                    tokio::time::sleep(delay).await;

                    if self.newest_submitted.load(Ordering::SeqCst) > seq {
                        return Ok(None);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
