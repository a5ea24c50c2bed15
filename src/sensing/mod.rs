//! Per-frame sensing
//!
//! Turns face landmarks into a normalized mouth aperture, classifies the
//! mouth state, and tracks utterance durations. Everything here is driven by
//! the frame loop in `engine`; no network or audio work happens on this path.

mod aperture;
mod landmarks;
mod tracker;

pub use aperture::{ApertureSample, ApertureSampler, MouthState, mouth_state};
pub use landmarks::{LandmarkSet, Point3, lip_indices, normalized_aperture};
pub use tracker::{MIN_UTTERANCE, TrackerEvent, UtteranceTracker, VISUAL_FREEZE};
