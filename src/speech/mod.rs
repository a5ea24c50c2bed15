//! Speech output
//!
//! Thin facade over the synthesis capability: picks a voice once
//! (best-effort), synthesizes each detected sentence, and plays it with
//! at-most-one-utterance-audible semantics. A missing voice catalog
//! degrades to a silent no-op; failures are logged, never propagated into
//! the classification path.

mod playback;
mod synth;
mod voice;

pub use playback::Playback;
pub use synth::{RemoteSynthesizer, Synthesizer};
pub use voice::{Voice, select_voice};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::Result;

/// Anything that can speak a detected sentence aloud
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak the text, cancelling any currently playing utterance first
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Speech output over a synthesizer and the local audio device
pub struct SpeechOutput {
    synth: Arc<dyn Synthesizer>,
    playback: Playback,
    /// Voice picked on first use; `Some(None)` means enumeration ran and
    /// found nothing, so output stays silent
    selected: Mutex<Option<Option<Voice>>>,
}

impl SpeechOutput {
    #[must_use]
    pub fn new(synth: Arc<dyn Synthesizer>) -> Self {
        Self {
            synth,
            playback: Playback::new(),
            selected: Mutex::new(None),
        }
    }

    /// The voice this output will use, enumerating and selecting on first
    /// call
    pub async fn voice(&self) -> Option<Voice> {
        let mut selected = self.selected.lock().await;

        if selected.is_none() {
            let picked = match self.synth.voices().await {
                Ok(voices) => {
                    let picked = select_voice(&voices).cloned();
                    match &picked {
                        Some(v) => tracing::debug!(voice = %v.name, "voice selected"),
                        None => tracing::warn!("no voices available, speech disabled"),
                    }
                    picked
                }
                Err(e) => {
                    tracing::warn!(error = %e, "voice enumeration failed, speech disabled");
                    None
                }
            };
            *selected = Some(picked);
        }

        selected.clone().flatten()
    }

    /// Cancel whatever is currently playing
    pub fn cancel(&self) {
        self.playback.cancel();
    }
}

#[async_trait]
impl Speaker for SpeechOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        let Some(voice) = self.voice().await else {
            // Best-effort degradation: no voices, stay silent
            return Ok(());
        };

        let audio = self.synth.synthesize(text, &voice).await?;
        self.playback.play_mp3(&audio)?;

        tracing::info!(text, voice = %voice.id, "speaking");
        Ok(())
    }
}
