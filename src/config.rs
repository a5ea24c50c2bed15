//! Configuration management for the aperture gateway

use std::env;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::classify::SentenceMap;
use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote duration classifier
    pub classifier: ClassifierConfig,

    /// Speech output
    pub speech: SpeechConfig,
}

/// Remote classifier configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Classification endpoint URL
    pub endpoint: String,

    /// API credential (from `APERTURE_API_KEY` env)
    pub api_key: SecretString,

    /// Duration-to-sentence manifest shipped with each request
    pub mapping: SentenceMap,
}

/// Speech output configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Enable speech output
    pub enabled: bool,

    /// Synthesis endpoint URL
    pub endpoint: String,

    /// API credential (from `APERTURE_TTS_KEY` env, falls back to the
    /// classifier credential)
    pub api_key: Option<SecretString>,

    /// TTS model identifier
    pub model: String,

    /// TTS speed multiplier
    pub speed: f32,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns error if the classifier credential is missing or the mapping
    /// manifest fails to load
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration, optionally forcing speech output off
    ///
    /// # Errors
    ///
    /// Returns error if the classifier credential is missing or the mapping
    /// manifest fails to load
    pub fn load_with_options(disable_speech: bool) -> Result<Self> {
        let api_key = env::var("APERTURE_API_KEY")
            .map(SecretString::from)
            .map_err(|_| {
                Error::Config("APERTURE_API_KEY is required (inject via environment)".to_string())
            })?;

        let mapping = match env::var("APERTURE_MAPPING").ok().map(PathBuf::from) {
            Some(path) => SentenceMap::from_toml_file(&path)?,
            None => SentenceMap::default(),
        };

        let classifier = ClassifierConfig {
            endpoint: env::var("APERTURE_CLASSIFIER_URL")
                .unwrap_or_else(|_| "https://api.omni.dev/v1/duration/classify".to_string()),
            api_key: api_key.clone(),
            mapping,
        };

        let speech_enabled =
            !disable_speech && env::var("APERTURE_DISABLE_SPEECH").is_err();

        let speech = SpeechConfig {
            enabled: speech_enabled,
            endpoint: env::var("APERTURE_TTS_URL")
                .unwrap_or_else(|_| "https://api.omni.dev/v1/audio/speech".to_string()),
            api_key: env::var("APERTURE_TTS_KEY")
                .map(SecretString::from)
                .ok()
                .or(Some(api_key)),
            model: env::var("APERTURE_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            speed: env::var("APERTURE_TTS_SPEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        };

        Ok(Self { classifier, speech })
    }
}
