//! Time windows over the timeline and the feature each one needs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::access::Feature;
use crate::emotion::EmotionEntry;
use crate::error::ValidationError;

/// How far back a tier without `extendedHistory` can look.
pub const BASIC_HISTORY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "period")]
pub enum TimePeriod {
    Day,
    Week,
    Month,
    Quarter,
    Custom {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl TimePeriod {
    /// Build a custom range, rejecting an end before the start.
    pub fn custom(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if to < from {
            return Err(ValidationError::InvalidTimeRange { start: from, end: to });
        }
        Ok(TimePeriod::Custom { from, to })
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            TimePeriod::Day => Some(1),
            TimePeriod::Week => Some(7),
            TimePeriod::Month => Some(30),
            TimePeriod::Quarter => Some(90),
            TimePeriod::Custom { .. } => None,
        }
    }

    /// Inclusive bounds of the window relative to `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            TimePeriod::Custom { from, to } => (*from, *to),
            named => {
                let days = named.days().unwrap_or(BASIC_HISTORY_DAYS);
                (now - Duration::days(days), now)
            }
        }
    }

    pub fn contains(&self, entry: &EmotionEntry, now: DateTime<Utc>) -> bool {
        let (from, to) = self.bounds(now);
        entry.timestamp >= from && entry.timestamp <= to
    }

    /// Entries inside the window, in stored order.
    pub fn filter(&self, entries: &[EmotionEntry], now: DateTime<Utc>) -> Vec<EmotionEntry> {
        entries
            .iter()
            .filter(|e| self.contains(e, now))
            .cloned()
            .collect()
    }

    /// Feature a tier needs before it may query this window.
    pub fn required_feature(&self) -> Feature {
        match self {
            TimePeriod::Day | TimePeriod::Week => Feature::BasicTimeline,
            TimePeriod::Month | TimePeriod::Quarter => Feature::ExtendedHistory,
            TimePeriod::Custom { .. } => Feature::CustomTimeRanges,
        }
    }
}

impl FromStr for TimePeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimePeriod::Day),
            "week" => Ok(TimePeriod::Week),
            "month" => Ok(TimePeriod::Month),
            "quarter" => Ok(TimePeriod::Quarter),
            _ => Err(ValidationError::UnknownTimePeriod(s.to_string())),
        }
    }
}
