//! Session controller
//!
//! Wires the per-frame path together: camera frames in, landmark detection,
//! aperture classification, utterance tracking, and fire-and-forget
//! classification hand-off. The frame loop keeps running at the video rate
//! no matter what any in-flight classification is doing.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classify::DurationClassifier;
use crate::sensing::{
    ApertureSample, ApertureSampler, LandmarkSet, MIN_UTTERANCE, TrackerEvent, UtteranceTracker,
    VISUAL_FREEZE, normalized_aperture,
};
use crate::telemetry::{DisplayState, FpsCounter};
use crate::Result;

/// One captured video frame, opaque to this crate
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Live video frame supplier (camera capability)
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, `None` at end of stream.
    ///
    /// # Errors
    ///
    /// An error is terminal: permission denied, no device. The caller
    /// surfaces it once and stops; there is no automatic retry.
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>>;
}

/// Face landmark detector capability
pub trait FaceLandmarker: Send {
    /// Detect zero or one face in the frame. `None` means no face, which
    /// the sampler treats as a closed mouth with zero intensity.
    ///
    /// # Errors
    ///
    /// An error is terminal (model load or inference failure).
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<LandmarkSet>>;
}

/// Per-frame session controller
pub struct Engine {
    sampler: ApertureSampler,
    tracker: UtteranceTracker,
    fps: FpsCounter,
    display: Arc<DisplayState>,
    classifier: Arc<DurationClassifier>,
    reading_enabled: bool,
    freeze_timer: Option<JoinHandle<()>>,
}

impl Engine {
    #[must_use]
    pub fn new(display: Arc<DisplayState>, classifier: Arc<DurationClassifier>) -> Self {
        Self {
            sampler: ApertureSampler::new(),
            tracker: UtteranceTracker::new(),
            fps: FpsCounter::new(),
            display,
            classifier,
            reading_enabled: true,
            freeze_timer: None,
        }
    }

    /// The display surface this engine publishes to
    #[must_use]
    pub const fn display(&self) -> &Arc<DisplayState> {
        &self.display
    }

    /// Toggle duration tracking; disabling abandons any active session
    pub fn set_reading_enabled(&mut self, enabled: bool) {
        self.reading_enabled = enabled;
        if !enabled {
            self.tracker.reset();
        }
    }

    /// Drive the engine from the camera and landmark capabilities until the
    /// source ends or shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns the first acquisition error (camera or landmark model);
    /// these are terminal and reported once. Classification errors never
    /// surface here.
    pub async fn run<S, L>(
        &mut self,
        source: &mut S,
        landmarker: &mut L,
        shutdown: &mut mpsc::Receiver<()>,
    ) -> Result<()>
    where
        S: FrameSource,
        L: FaceLandmarker,
    {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                frame = source.next_frame() => {
                    let Some(frame) = frame? else {
                        tracing::info!("frame source ended");
                        break;
                    };
                    let landmarks = landmarker.detect(&frame)?;
                    self.process_landmarks(landmarks.as_ref(), Instant::now());
                }
            }
        }

        Ok(())
    }

    /// Process one frame's landmark detection result
    pub fn process_landmarks(&mut self, landmarks: Option<&LandmarkSet>, now: Instant) {
        let sample = match landmarks.and_then(|set| normalized_aperture(set)) {
            Some(distance) => self.sampler.sample(distance),
            None => self.sampler.sample_absent(),
        };
        self.apply_sample(sample, now);
    }

    /// Process one frame given an already-normalized aperture distance
    /// (replay and test path)
    pub fn process_distance(&mut self, inner_distance: f64, now: Instant) {
        let sample = self.sampler.sample(inner_distance);
        self.apply_sample(sample, now);
    }

    fn apply_sample(&mut self, sample: ApertureSample, now: Instant) {
        if let Some(fps) = self.fps.tick(now) {
            self.display.set_fps(fps);
        }
        self.display.set_sample(sample.state, sample.intensity);

        if !self.reading_enabled {
            return;
        }

        match self.tracker.sample(sample.state, now) {
            Some(TrackerEvent::Started) => {
                tracing::debug!("utterance started");
                self.display.clear_prediction();
                if let Some(timer) = self.freeze_timer.take() {
                    timer.abort();
                }
            }
            Some(TrackerEvent::Progress { elapsed }) => {
                self.display.set_duration(elapsed.as_secs_f64());
            }
            Some(TrackerEvent::Finished { duration }) => {
                self.display.clear_live_duration();
                self.schedule_visual_clear();

                if duration > MIN_UTTERANCE {
                    tracing::info!(secs = duration.as_secs_f64(), "utterance finished");
                    let _handle = self.classifier.submit(duration);
                } else {
                    // Sub-threshold opens are noise; no call, no signal
                    tracing::debug!(secs = duration.as_secs_f64(), "utterance discarded");
                }
            }
            None => {}
        }
    }

    /// Freeze the visual duration display briefly after an utterance ends;
    /// a new timer replaces any pending one
    fn schedule_visual_clear(&mut self) {
        if let Some(timer) = self.freeze_timer.take() {
            timer.abort();
        }

        let display = Arc::clone(&self.display);
        self.freeze_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(VISUAL_FREEZE).await;
            display.clear_visual_duration();
        }));
    }
}
