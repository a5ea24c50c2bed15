//! Aperture Gateway - Lip-aperture assistive communication
//!
//! Watches a patient's lip movement, measures how long the mouth stays open
//! during an articulation window, maps that duration to a calibrated
//! sentence via a remote classification service, and speaks the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               External capabilities                  │
//! │  Camera  │  Face landmarks  │  Classifier  │  TTS   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                Aperture Gateway                      │
//! │  Sampler │ Duration Tracker │ Classifier │ Speech   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │       Display surface (live telemetry)               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The frame loop is sacrosanct: classification runs as fire-and-forget
//! tasks under a process-wide call spacer, and no request's failure ever
//! interrupts sampling.

pub mod classify;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod sensing;
pub mod speech;
pub mod telemetry;

pub use classify::{
    ClassificationResult, DurationClassifier, RemoteClassifier, RetryPolicy, SentenceMap,
    SentenceProvider,
};
pub use config::Config;
pub use context::{PatientContext, SharedContext};
pub use engine::{Engine, FaceLandmarker, FrameSource, VideoFrame};
pub use error::{Error, Result};
pub use sensing::{ApertureSampler, MouthState, UtteranceTracker};
pub use speech::{Speaker, SpeechOutput};
pub use telemetry::{DisplaySnapshot, DisplayState};
