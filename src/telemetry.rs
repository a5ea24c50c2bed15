//! Display surface state
//!
//! Live telemetry shared between the frame loop and in-flight
//! classification tasks: mouth state, intensity, FPS, live/visual duration,
//! the latest prediction, the in-progress indicator, and status text.
//!
//! Classification tasks may complete out of order; every write from one
//! carries the request's sequence number and only the highest sequence seen
//! so far may touch the prediction or status fields.

use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

use crate::classify::ClassificationResult;
use crate::sensing::MouthState;

/// Shared, sequence-guarded display state
#[derive(Debug)]
pub struct DisplayState {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    mouth_state: MouthState,
    intensity: f64,
    fps: u32,
    live_duration_secs: Option<f64>,
    visual_duration_secs: Option<f64>,
    prediction: Option<ClassificationResult>,
    status: Option<String>,
    in_flight: u32,
    last_seq: u64,
}

/// Point-in-time copy of the display surface
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySnapshot {
    pub mouth_state: MouthState,
    /// Articulation intensity percentage, 0-100
    pub intensity: f64,
    pub fps: u32,
    /// Live duration of the active utterance, cleared the moment it ends
    pub live_duration_secs: Option<f64>,
    /// Softer echo of the duration that stays frozen briefly after the end
    pub visual_duration_secs: Option<f64>,
    pub prediction: Option<ClassificationResult>,
    /// Whether any classification request is still in flight
    pub in_progress: bool,
    pub status: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                mouth_state: MouthState::Closed,
                intensity: 0.0,
                fps: 0,
                live_duration_secs: None,
                visual_duration_secs: None,
                prediction: None,
                status: None,
                in_flight: 0,
                last_seq: 0,
            }),
        }
    }
}

impl DisplayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the current frame's classified sample
    pub fn set_sample(&self, state: MouthState, intensity: f64) {
        let mut inner = self.lock();
        inner.mouth_state = state;
        inner.intensity = intensity;
    }

    pub fn set_fps(&self, fps: u32) {
        self.lock().fps = fps;
    }

    /// Publish the active utterance's elapsed time (live and visual)
    pub fn set_duration(&self, secs: f64) {
        let mut inner = self.lock();
        inner.live_duration_secs = Some(secs);
        inner.visual_duration_secs = Some(secs);
    }

    /// Clear the live duration the moment an utterance ends
    pub fn clear_live_duration(&self) {
        self.lock().live_duration_secs = None;
    }

    /// Clear the frozen visual duration once its freeze delay expires
    pub fn clear_visual_duration(&self) {
        self.lock().visual_duration_secs = None;
    }

    /// Clear the displayed prediction (a new utterance started)
    pub fn clear_prediction(&self) {
        self.lock().prediction = None;
    }

    /// A classification request entered flight
    pub fn begin_request(&self) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_add(1);
    }

    /// A classification request left flight, whichever way it ended
    pub fn end_request(&self) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }

    /// Apply a finished request's result. Returns false (and changes
    /// nothing) when a higher-sequence request already wrote.
    pub fn apply_prediction(&self, seq: u64, result: ClassificationResult) -> bool {
        let mut inner = self.lock();
        if seq < inner.last_seq {
            return false;
        }
        inner.last_seq = seq;
        inner.prediction = Some(result);
        inner.status = None;
        true
    }

    /// Apply a request's terminal error message, sequence-guarded
    pub fn apply_error(&self, seq: u64, message: String) -> bool {
        self.apply_status(seq, Some(message))
    }

    /// Set or clear a request's transient status text, sequence-guarded
    pub fn apply_status(&self, seq: u64, status: Option<String>) -> bool {
        let mut inner = self.lock();
        if seq < inner.last_seq {
            return false;
        }
        inner.last_seq = seq;
        inner.status = status;
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        let inner = self.lock();
        DisplaySnapshot {
            mouth_state: inner.mouth_state,
            intensity: inner.intensity,
            fps: inner.fps,
            live_duration_secs: inner.live_duration_secs,
            visual_duration_secs: inner.visual_duration_secs,
            prediction: inner.prediction.clone(),
            in_progress: inner.in_flight > 0,
            status: inner.status.clone(),
        }
    }
}

/// Frame-rate counter from frame arrival deltas
#[derive(Debug, Default)]
pub struct FpsCounter {
    last: Option<Instant>,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame arrival; returns the instantaneous FPS once two
    /// frames have been seen
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let fps = self.last.map(|last| {
            let delta = now.duration_since(last).as_secs_f64();
            if delta <= f64::EPSILON {
                0
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    (1.0 / delta).round() as u32
                }
            }
        });
        self.last = Some(now);
        fps
    }
}
