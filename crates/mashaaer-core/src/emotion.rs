//! Emotion tags and timeline entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Tags the detector is known to emit, with their Arabic display names.
pub const KNOWN_EMOTIONS: [(&str, &str); 7] = [
    ("happy", "سعيد"),
    ("sad", "حزين"),
    ("angry", "غاضب"),
    ("surprised", "متفاجئ"),
    ("neutral", "محايد"),
    ("anxious", "قلق"),
    ("confident", "واثق"),
];

/// Intensity used when the detector reports a non-finite value.
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// An emotion tag. Open-ended: unknown tags are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emotion(String);

impl Emotion {
    /// Normalize a detector tag. Arabic display names map back to their
    /// English tag; ASCII tags are lower-cased.
    pub fn new(tag: &str) -> Result<Self, ValidationError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ValidationError::EmptyEmotion);
        }
        if let Some((known, _)) = KNOWN_EMOTIONS.iter().find(|(_, ar)| *ar == tag) {
            return Ok(Emotion((*known).to_string()));
        }
        Ok(Emotion(tag.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        KNOWN_EMOTIONS.iter().any(|(tag, _)| *tag == self.0)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Emotion {
    /// Infallible conversion for literals; empty input becomes `neutral`.
    fn from(tag: &str) -> Self {
        Emotion::new(tag).unwrap_or_else(|_| Emotion("neutral".to_string()))
    }
}

/// Clamp a reported intensity into [0, 1].
pub fn normalize_intensity(intensity: f64) -> f64 {
    if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        DEFAULT_INTENSITY
    }
}

/// One recorded emotion observation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub emotion: Emotion,
    pub intensity: f64,
    pub timestamp: DateTime<Utc>,
}

impl EmotionEntry {
    /// Entry stamped with the current time.
    pub fn observed(emotion: Emotion, intensity: f64) -> Self {
        Self::at(emotion, intensity, Utc::now())
    }

    pub fn at(emotion: Emotion, intensity: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            emotion,
            intensity: normalize_intensity(intensity),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_names_map_to_tags() {
        assert_eq!(Emotion::new("سعيد").unwrap().as_str(), "happy");
        assert_eq!(Emotion::new(" قلق ").unwrap().as_str(), "anxious");
    }

    #[test]
    fn tags_are_lowercased_and_unknown_tags_kept() {
        assert_eq!(Emotion::new("Happy").unwrap().as_str(), "happy");
        let e = Emotion::new("nostalgic").unwrap();
        assert_eq!(e.as_str(), "nostalgic");
        assert!(!e.is_known());
    }

    #[test]
    fn empty_tag_is_rejected() {
        assert!(Emotion::new("   ").is_err());
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(normalize_intensity(1.7), 1.0);
        assert_eq!(normalize_intensity(-0.2), 0.0);
        assert_eq!(normalize_intensity(0.42), 0.42);
        assert_eq!(normalize_intensity(f64::NAN), DEFAULT_INTENSITY);
        assert_eq!(normalize_intensity(f64::INFINITY), DEFAULT_INTENSITY);
    }

    #[test]
    fn entry_serializes_to_flat_json() {
        let ts = DateTime::parse_from_rfc3339("2025-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = EmotionEntry::at("happy".into(), 0.8, ts);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["emotion"], "happy");
        assert_eq!(json["intensity"], 0.8);
        assert_eq!(json["timestamp"], "2025-05-01T10:00:00Z");
    }
}
