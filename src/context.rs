//! Patient context
//!
//! A bounded log of the most recently detected sentences plus static
//! reference data (frequent phrases, calibration examples) shown alongside
//! the live feed. Owned by the session controller; the classifier only
//! appends on successful non-empty results.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Shared handle to the session's patient context
pub type SharedContext = Arc<Mutex<PatientContext>>;

/// Maximum number of detected sentences kept in the history
pub const HISTORY_LIMIT: usize = 5;

/// One successfully detected sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMessage {
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Calibration reference entry for the patient's articulation profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationExample {
    pub phrase_text: String,
    pub embedding_description: String,
}

/// Session-scoped patient reference data and detection history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    pub frequent_phrases: Vec<String>,
    /// Most recent detections, newest first, bounded at [`HISTORY_LIMIT`]
    pub last_messages: Vec<RecordedMessage>,
    pub calibration_examples: Vec<CalibrationExample>,
}

impl Default for PatientContext {
    fn default() -> Self {
        Self {
            frequent_phrases: ["Emergency", "Comfort", "Medical", "Response"]
                .map(str::to_string)
                .to_vec(),
            last_messages: vec![RecordedMessage {
                text: "Response".to_string(),
                at: Utc::now(),
            }],
            calibration_examples: vec![
                CalibrationExample {
                    phrase_text: "Emergency".to_string(),
                    embedding_description:
                        "Wide vertical opening on 'E', sustained aperture for 'mergency'."
                            .to_string(),
                },
                CalibrationExample {
                    phrase_text: "Comfort".to_string(),
                    embedding_description:
                        "Rounded lip protrusion for 'Co', quick closure for 'm', followed by 'fort'."
                            .to_string(),
                },
            ],
        }
    }
}

impl PatientContext {
    /// Shared default context
    #[must_use]
    pub fn shared() -> SharedContext {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Prepend a detected sentence, dropping the oldest past the bound
    pub fn push_message(&mut self, text: String) {
        self.last_messages.insert(0, RecordedMessage {
            text,
            at: Utc::now(),
        });
        self.last_messages.truncate(HISTORY_LIMIT);
    }
}

/// Coarse local time-of-day bucket for context display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket for the current local time
    #[must_use]
    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    /// Bucket for an hour of day (0-23)
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut context = PatientContext::default();
        context.last_messages.clear();

        for i in 1..=6 {
            context.push_message(format!("sentence {i}"));
        }

        assert_eq!(context.last_messages.len(), HISTORY_LIMIT);
        let texts: Vec<&str> = context
            .last_messages
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec![
                "sentence 6",
                "sentence 5",
                "sentence 4",
                "sentence 3",
                "sentence 2"
            ]
        );
    }

    #[test]
    fn default_context_matches_reference_data() {
        let context = PatientContext::default();
        assert_eq!(context.frequent_phrases.len(), 4);
        assert_eq!(context.calibration_examples.len(), 2);
        assert_eq!(context.last_messages[0].text, "Response");
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }
}
