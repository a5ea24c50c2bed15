//! Shared test utilities
//!
//! Scripted stand-ins for the remote classification service and the speech
//! capability, so pipeline tests run without network or audio hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use aperture_gateway::classify::{ClassificationResult, SentenceMap, SentenceProvider};
use aperture_gateway::speech::Speaker;
use aperture_gateway::{Error, Result};

/// Scripted outcome for one classification call
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok(ClassificationResult),
    /// Success that takes this long to come back
    SlowOk(ClassificationResult, u64),
    Throttle,
    Fail,
}

/// One recorded dispatch: the duration sent and when it left
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub duration_seconds: f64,
    pub at: Instant,
}

/// Sentence provider that plays back a script and records every dispatch.
///
/// With an empty script it emulates the remote service's fixed mapping:
/// durations inside a calibrated window map to that window's sentence,
/// anything else to the no-match sentinel.
pub struct MockProvider {
    script: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<RecordedCall>>,
    mapping: SentenceMap,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::scripted([])
    }
}

impl MockProvider {
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            mapping: SentenceMap::default(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Emulate the service's deterministic duration lookup
    pub fn service_result(&self, duration_seconds: f64) -> ClassificationResult {
        let matched = self
            .mapping
            .ranges
            .iter()
            .find(|r| r.min_secs <= duration_seconds && duration_seconds < r.max_secs);

        match matched {
            Some(range) => ClassificationResult {
                detected_sentence: range.sentence.clone(),
                confidence: 0.97,
                engine: "mock-duration-engine".to_string(),
            },
            None => ClassificationResult {
                detected_sentence: "No valid sentence detected.".to_string(),
                confidence: 0.0,
                engine: "mock-duration-engine".to_string(),
            },
        }
    }
}

#[async_trait]
impl SentenceProvider for MockProvider {
    async fn classify(&self, duration_seconds: f64) -> Result<ClassificationResult> {
        self.calls.lock().unwrap().push(RecordedCall {
            duration_seconds,
            at: Instant::now(),
        });

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Outcome::Ok(result)) => Ok(result),
            Some(Outcome::SlowOk(result, delay_ms)) => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(result)
            }
            Some(Outcome::Throttle) => Err(Error::Throttled("429: slow down".to_string())),
            Some(Outcome::Fail) => {
                Err(Error::Classification("502: upstream unavailable".to_string()))
            }
            None => Ok(self.service_result(duration_seconds)),
        }
    }

    fn name(&self) -> &'static str {
        "mock-provider"
    }
}

/// Speaker that records what it was asked to say
#[derive(Default)]
pub struct MockSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl MockSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A result carrying the given sentence at high confidence
pub fn result(sentence: &str) -> ClassificationResult {
    ClassificationResult {
        detected_sentence: sentence.to_string(),
        confidence: 0.95,
        engine: "mock-duration-engine".to_string(),
    }
}

/// A successful scripted outcome carrying the given sentence
pub fn ok_result(sentence: &str) -> Outcome {
    Outcome::Ok(result(sentence))
}
