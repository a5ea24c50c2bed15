//! Error types for the aperture gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the aperture gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera acquisition error (permission denied, no device)
    #[error("camera error: {0}")]
    Camera(String),

    /// Face landmark model error (load or inference failure)
    #[error("landmark error: {0}")]
    Landmark(String),

    /// Remote classifier rejected the call with a throttling signal;
    /// recoverable via backoff
    #[error("classifier throttled: {0}")]
    Throttled(String),

    /// Throttling persisted through every retry attempt
    #[error("classification quota exhausted")]
    QuotaExceeded,

    /// Terminal per-request classification failure
    #[error("classification error: {0}")]
    Classification(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// Audio playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this failure is a transient throttling signal worth retrying
    #[must_use]
    pub const fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }

    /// Convert a classifier-path failure into the string shown on the
    /// display surface. Classifier errors never propagate past the request
    /// that produced them; this is their terminal form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::QuotaExceeded => "System quota exceeded. Please wait 60 seconds.".to_string(),
            Self::Classification(_) | Self::Http(_) | Self::Serialization(_) => {
                "Connection error. Please try again.".to_string()
            }
            Self::Throttled(_) => "Rate limit reached. Retrying...".to_string(),
            Self::Camera(_) => "Camera access denied or not found.".to_string(),
            Self::Landmark(_) => {
                "Failed to load vision models. Please check your connection.".to_string()
            }
            other => other.to_string(),
        }
    }
}
