//! Remote sentence-mapping provider
//!
//! The classification itself happens on a remote service: the client sends
//! the utterance duration (plus the structured mapping manifest the service
//! classifies against) and validates the strict-JSON response.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::classify::mapping::{NO_MATCH_SENTENCE, SentenceMap};
use crate::classify::retry::is_throttle_signal;
use crate::{Error, Result};

/// A service that maps an utterance duration to a sentence
#[async_trait]
pub trait SentenceProvider: Send + Sync {
    /// Classify one duration. Throttling failures surface as
    /// `Error::Throttled`; everything else is terminal for the request.
    async fn classify(&self, duration_seconds: f64) -> Result<ClassificationResult>;

    /// Provider name for diagnostics
    fn name(&self) -> &'static str;
}

/// Result of one classification call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationResult {
    /// Sentence the duration mapped to, or the no-match sentinel
    pub detected_sentence: String,
    /// Match confidence; `0` signals no match
    pub confidence: f64,
    /// Label of the engine that produced the result
    pub engine: String,
}

impl ClassificationResult {
    /// Whether this result carries a real sentence worth speaking and
    /// recording
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.confidence > 0.0 && self.detected_sentence != NO_MATCH_SENTENCE
    }
}

/// HTTP sentence-mapping provider
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    mapping: SentenceMap,
}

impl RemoteClassifier {
    /// Create a provider for the given endpoint and injected credential
    #[must_use]
    pub fn new(endpoint: String, api_key: SecretString, mapping: SentenceMap) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            mapping,
        }
    }

    /// The mapping manifest this provider ships with each request
    #[must_use]
    pub const fn mapping(&self) -> &SentenceMap {
        &self.mapping
    }
}

#[async_trait]
impl SentenceProvider for RemoteClassifier {
    async fn classify(&self, duration_seconds: f64) -> Result<ClassificationResult> {
        let request = ClassifyRequest {
            duration_seconds,
            mapping: &self.mapping,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_throttle_signal(status.as_u16(), &body) {
                return Err(Error::Throttled(format!("{status}: {body}")));
            }
            return Err(Error::Classification(format!("{status}: {body}")));
        }

        let body = response.text().await?;
        let result: ClassificationResult = serde_json::from_str(&body)?;

        tracing::debug!(
            duration_seconds,
            sentence = %result.detected_sentence,
            confidence = result.confidence,
            engine = %result.engine,
            "classification response"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "remote-duration-classifier"
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    duration_seconds: f64,
    mapping: &'a SentenceMap,
}
