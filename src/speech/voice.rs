//! Voice descriptors and best-effort selection

use serde::{Deserialize, Serialize};

/// One synthesizer voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Identifier passed back to the synthesizer
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// BCP 47 language tag, e.g. "en-US"
    pub language: String,
    /// Whether this is an enhanced/natural-quality voice
    pub enhanced: bool,
}

impl Voice {
    fn is_english(&self) -> bool {
        self.language.starts_with("en-") || self.language == "en"
    }
}

/// Pick a voice, best-effort: an enhanced English voice, then any English
/// voice, then the first voice at all. `None` means stay silent.
#[must_use]
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| v.enhanced && v.is_english())
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .or_else(|| voices.first())
}
