//! Duration-to-sentence mapping manifest
//!
//! The mapping is authoritative external data owned by the remote
//! classification service: the client ships it verbatim and never evaluates
//! the ranges itself. It is held as versioned structured data — loadable
//! from a TOML manifest, with the calibrated defaults compiled in — instead
//! of living inside a prompt string.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentence returned by the service for durations outside every range
pub const NO_MATCH_SENTENCE: &str = "No valid sentence detected.";

/// One calibrated duration window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    /// Inclusive lower bound, seconds
    pub min_secs: f64,
    /// Exclusive upper bound, seconds
    pub max_secs: f64,
    /// Sentence this window maps to
    pub sentence: String,
}

/// Versioned duration-to-sentence table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMap {
    /// Manifest version label
    pub version: String,
    /// Calibrated windows, ascending and non-overlapping
    pub ranges: Vec<DurationRange>,
}

impl Default for SentenceMap {
    fn default() -> Self {
        let sentences = [
            "I am in pain.",
            "I feel cold.",
            "I am scared.",
            "Please turn me.",
            "I need suction.",
            "I want to sleep.",
            "Please adjust my pillow.",
            "I need the doctor.",
            "Please call the nurse.",
            "I need help immediately.",
            "I cannot breathe.",
            "I need to use the bathroom.",
        ];

        // Twelve contiguous 1.2s windows starting at 1.4s; each window
        // begins exactly where the previous one ends
        let mut ranges = Vec::with_capacity(sentences.len());
        let mut min_secs = 1.4;
        for sentence in sentences {
            let max_secs = min_secs + 1.2;
            ranges.push(DurationRange {
                min_secs,
                max_secs,
                sentence: sentence.to_string(),
            });
            min_secs = max_secs;
        }

        Self {
            version: "2".to_string(),
            ranges,
        }
    }
}

impl SentenceMap {
    /// Load a manifest from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse and validate a TOML manifest
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(raw: &str) -> Result<Self> {
        let map: Self = toml::from_str(raw)?;
        map.validate()?;
        Ok(map)
    }

    /// Check the ranges are well-formed, ascending, and non-overlapping
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first violation
    pub fn validate(&self) -> Result<()> {
        if self.ranges.is_empty() {
            return Err(Error::Config("sentence map has no ranges".to_string()));
        }

        for range in &self.ranges {
            if range.min_secs >= range.max_secs {
                return Err(Error::Config(format!(
                    "empty duration window {}..{}",
                    range.min_secs, range.max_secs
                )));
            }
        }

        for pair in self.ranges.windows(2) {
            if pair[1].min_secs < pair[0].max_secs {
                return Err(Error::Config(format!(
                    "overlapping duration windows at {}s",
                    pair[1].min_secs
                )));
            }
        }

        Ok(())
    }

    /// The calibrated sentences, in window order
    pub fn sentences(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|r| r.sentence.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_has_twelve_windows() {
        let map = SentenceMap::default();
        assert_eq!(map.ranges.len(), 12);
        assert!(map.validate().is_ok());

        let first = map.ranges.first().unwrap();
        let last = map.ranges.last().unwrap();
        assert!((first.min_secs - 1.4).abs() < 1e-9);
        assert!((last.max_secs - 15.8).abs() < 1e-9);
    }

    #[test]
    fn default_windows_are_contiguous() {
        let map = SentenceMap::default();
        for pair in map.ranges.windows(2) {
            assert!((pair[1].min_secs - pair[0].max_secs).abs() < 1e-9);
        }
    }

    #[test]
    fn suction_window_covers_seven_seconds() {
        let map = SentenceMap::default();
        let window = map
            .ranges
            .iter()
            .find(|r| r.min_secs <= 7.0 && 7.0 < r.max_secs)
            .unwrap();
        assert_eq!(window.sentence, "I need suction.");
    }

    #[test]
    fn parses_toml_manifest() {
        let raw = r#"
            version = "3"

            [[ranges]]
            min_secs = 1.0
            max_secs = 2.0
            sentence = "Yes."

            [[ranges]]
            min_secs = 2.0
            max_secs = 3.0
            sentence = "No."
        "#;

        let map = SentenceMap::from_toml(raw).unwrap();
        assert_eq!(map.version, "3");
        assert_eq!(map.sentences().collect::<Vec<_>>(), vec!["Yes.", "No."]);
    }

    #[test]
    fn rejects_overlapping_windows() {
        let raw = r#"
            version = "3"

            [[ranges]]
            min_secs = 1.0
            max_secs = 2.5
            sentence = "Yes."

            [[ranges]]
            min_secs = 2.0
            max_secs = 3.0
            sentence = "No."
        "#;

        assert!(SentenceMap::from_toml(raw).is_err());
    }

    #[test]
    fn rejects_empty_window() {
        let raw = r#"
            version = "3"

            [[ranges]]
            min_secs = 2.0
            max_secs = 2.0
            sentence = "Yes."
        "#;

        assert!(SentenceMap::from_toml(raw).is_err());
    }
}
