//! Subscription tiers and the feature-access table.
//!
//! The table is fixed at build time. Lookups are pure: the only side effect
//! is a warning when a caller asks about a feature name that does not exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Subscription level supplied by the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionLevel {
    #[default]
    Free,
    Basic,
    Premium,
}

impl SubscriptionLevel {
    pub const ALL: [SubscriptionLevel; 3] = [
        SubscriptionLevel::Free,
        SubscriptionLevel::Basic,
        SubscriptionLevel::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionLevel::Free => "free",
            SubscriptionLevel::Basic => "basic",
            SubscriptionLevel::Premium => "premium",
        }
    }
}

impl fmt::Display for SubscriptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionLevel::Free),
            "basic" => Ok(SubscriptionLevel::Basic),
            "premium" => Ok(SubscriptionLevel::Premium),
            _ => Err(ValidationError::UnknownSubscriptionLevel(s.to_string())),
        }
    }
}

/// A gated timeline feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    BasicTimeline,
    ExtendedHistory,
    AdvancedVisualization,
    EmotionPatternRecognition,
    EmotionExport,
    CustomTimeRanges,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::BasicTimeline,
        Feature::ExtendedHistory,
        Feature::AdvancedVisualization,
        Feature::EmotionPatternRecognition,
        Feature::EmotionExport,
        Feature::CustomTimeRanges,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::BasicTimeline => "basicTimeline",
            Feature::ExtendedHistory => "extendedHistory",
            Feature::AdvancedVisualization => "advancedVisualization",
            Feature::EmotionPatternRecognition => "emotionPatternRecognition",
            Feature::EmotionExport => "emotionExport",
            Feature::CustomTimeRanges => "customTimeRanges",
        }
    }

    /// Look up a feature by its camelCase name.
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Tiers that unlock this feature.
    pub fn allowed_tiers(&self) -> &'static [SubscriptionLevel] {
        use SubscriptionLevel::*;
        match self {
            Feature::BasicTimeline => &[Free, Basic, Premium],
            Feature::ExtendedHistory | Feature::AdvancedVisualization => &[Basic, Premium],
            Feature::EmotionPatternRecognition
            | Feature::EmotionExport
            | Feature::CustomTimeRanges => &[Premium],
        }
    }

    pub fn is_available_to(&self, level: SubscriptionLevel) -> bool {
        self.allowed_tiers().contains(&level)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check a feature by name. Unknown names are denied with a warning.
pub fn can_access_feature(feature: &str, level: SubscriptionLevel) -> bool {
    match Feature::from_name(feature) {
        Some(f) => f.is_available_to(level),
        None => {
            tracing::warn!(feature, "Unknown feature");
            false
        }
    }
}

/// Holds the active tier and answers access questions against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessGate {
    level: SubscriptionLevel,
}

impl AccessGate {
    pub fn new(level: SubscriptionLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> SubscriptionLevel {
        self.level
    }

    /// Change tier from a user-supplied string. Unknown levels keep the
    /// current tier and return `false`.
    pub fn set_level(&mut self, level: &str) -> bool {
        match level.parse::<SubscriptionLevel>() {
            Ok(parsed) => {
                self.level = parsed;
                tracing::info!(level = %parsed, "Subscription level set");
                true
            }
            Err(_) => {
                tracing::warn!(level, "Unknown subscription level");
                false
            }
        }
    }

    pub fn allows(&self, feature: Feature) -> bool {
        feature.is_available_to(self.level)
    }

    pub fn allows_named(&self, feature: &str) -> bool {
        can_access_feature(feature, self.level)
    }

    /// Features unlocked by the current tier, in table order.
    pub fn allowed_features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.allows(*f))
            .collect()
    }
}
