//! Utterance duration tracking
//!
//! Two-state machine fed one classified mouth state per frame. An utterance
//! runs from the first open frame to the next closed frame; the tracker
//! reports transitions as events and leaves every side effect (display
//! updates, classification hand-off, freeze timers) to the caller.

use std::time::{Duration, Instant};

use crate::sensing::MouthState;

/// Utterances at or below this duration are discarded as noise
pub const MIN_UTTERANCE: Duration = Duration::from_millis(500);

/// How long the visual duration display stays frozen after the mouth closes
pub const VISUAL_FREEZE: Duration = Duration::from_secs(1);

/// State transition reported for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Mouth opened while idle; an utterance session began
    Started,
    /// Mouth still open; live elapsed time since the session began
    Progress { elapsed: Duration },
    /// Mouth closed; the session's final duration
    Finished { duration: Duration },
}

/// Tracks the single active utterance session.
///
/// `started_at` is `Some` iff a session is active.
#[derive(Debug, Default)]
pub struct UtteranceTracker {
    started_at: Option<Instant>,
}

impl UtteranceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an utterance session is currently active
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.started_at.is_some()
    }

    /// Feed one frame's mouth state; `now` is the frame timestamp.
    ///
    /// Returns `None` for closed frames while idle — repeated closed frames
    /// never start a session.
    pub fn sample(&mut self, state: MouthState, now: Instant) -> Option<TrackerEvent> {
        if state.is_open() {
            match self.started_at {
                None => {
                    self.started_at = Some(now);
                    Some(TrackerEvent::Started)
                }
                Some(started) => Some(TrackerEvent::Progress {
                    elapsed: now.duration_since(started),
                }),
            }
        } else {
            self.started_at.take().map(|started| TrackerEvent::Finished {
                duration: now.duration_since(started),
            })
        }
    }

    /// Abandon any active session without reporting it
    pub fn reset(&mut self) {
        self.started_at = None;
    }
}
