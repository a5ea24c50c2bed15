//! Speech synthesis seam
//!
//! The platform capability behind speech output: enumerate voices,
//! synthesize text to audio. The remote implementation follows the common
//! speech-API shape (bearer key, JSON request, MP3 bytes back).

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::speech::voice::Voice;
use crate::{Error, Result};

/// Text-to-speech capability
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Available voices, in the platform's preference order
    async fn voices(&self) -> Result<Vec<Voice>>;

    /// Synthesize text with the given voice; returns MP3 bytes
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>>;
}

/// Remote HTTP synthesizer
pub struct RemoteSynthesizer {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    speed: f32,
}

impl RemoteSynthesizer {
    /// Create a synthesizer for the given endpoint and injected credential
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(endpoint: String, api_key: SecretString, model: String, speed: f32) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("speech API key required for TTS".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
            speed,
        })
    }
}

#[async_trait]
impl Synthesizer for RemoteSynthesizer {
    async fn voices(&self) -> Result<Vec<Voice>> {
        // The speech API exposes a fixed catalog rather than an enumeration
        // endpoint; "natural" variants are the enhanced tier.
        Ok(vec![
            Voice {
                id: "aria-natural".to_string(),
                name: "Aria (Natural)".to_string(),
                language: "en-US".to_string(),
                enhanced: true,
            },
            Voice {
                id: "aria".to_string(),
                name: "Aria".to_string(),
                language: "en-US".to_string(),
                enhanced: false,
            },
            Voice {
                id: "sol".to_string(),
                name: "Sol".to_string(),
                language: "en-GB".to_string(),
                enhanced: false,
            },
        ])
    }

    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &voice.id,
            speed: self.speed,
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

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Speech(format!("synthesis error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}
