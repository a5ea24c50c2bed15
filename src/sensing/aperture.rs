//! Mouth aperture classification
//!
//! Classifies per-frame mouth state from the normalized inner-lip distance
//! and its frame-to-frame velocity. Movement dominates over absolute
//! aperture: a fast-moving mouth reads as speaking even when nearly closed.

use serde::{Deserialize, Serialize};

/// Velocity above which movement reads as active articulation
const SPEAKING_VELOCITY: f64 = 0.008;

/// Normalized aperture below which the mouth reads as closed
const CLOSED_APERTURE: f64 = 0.01;

/// Normalized aperture below which the mouth reads as slightly open
const SLIGHT_APERTURE: f64 = 0.04;

/// Display intensity scale factor applied to velocity
const INTENSITY_SCALE: f64 = 500.0;

/// Per-frame mouth state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouthState {
    Closed,
    SlightlyOpen,
    FullyOpen,
    Speaking,
}

impl MouthState {
    /// Any state other than `Closed` counts as open for duration tracking
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Classify one frame's measurements. Pure function of the two inputs;
/// the distance must already be normalized by a face-scale reference.
#[must_use]
pub fn mouth_state(inner_distance: f64, velocity: f64) -> MouthState {
    if velocity > SPEAKING_VELOCITY {
        return MouthState::Speaking;
    }
    if inner_distance < CLOSED_APERTURE {
        return MouthState::Closed;
    }
    if inner_distance < SLIGHT_APERTURE {
        return MouthState::SlightlyOpen;
    }
    MouthState::FullyOpen
}

/// One classified sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApertureSample {
    pub state: MouthState,
    /// Absolute frame-to-frame aperture change
    pub velocity: f64,
    /// Display intensity percentage, 0-100
    pub intensity: f64,
}

/// Derives velocity across successive frames and classifies each one.
///
/// Holds only the previous frame's distance; no debounce is applied, so
/// single-frame noise can flip the state.
#[derive(Debug, Default)]
pub struct ApertureSampler {
    last_distance: f64,
}

impl ApertureSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next frame's normalized inner-lip distance
    pub fn sample(&mut self, inner_distance: f64) -> ApertureSample {
        let velocity = (inner_distance - self.last_distance).abs();
        self.last_distance = inner_distance;

        ApertureSample {
            state: mouth_state(inner_distance, velocity),
            velocity,
            intensity: (velocity * INTENSITY_SCALE).min(100.0),
        }
    }

    /// Sample for a frame with no detected face: closed, zero intensity
    pub fn sample_absent(&mut self) -> ApertureSample {
        self.last_distance = 0.0;
        ApertureSample {
            state: MouthState::Closed,
            velocity: 0.0,
            intensity: 0.0,
        }
    }
}
