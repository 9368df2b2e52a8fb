//! Running statistics over every entry ever recorded.
//!
//! Updates are O(1) per entry and value-semantic: `update` consumes the old
//! stats and returns the new ones. The incremental mean depends on call
//! order, so `update` must run exactly once per appended entry, in append
//! order. `rebuild` replays the same formula over a slice of entries.

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::emotion::{Emotion, EmotionEntry};

/// Emotion → occurrence count, ordered by tag.
pub type EmotionCounts = BTreeMap<Emotion, u64>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    #[serde(default)]
    pub most_frequent: Option<Emotion>,
    #[serde(default)]
    pub average_intensity: f64,
    #[serde(default)]
    pub emotion_counts: EmotionCounts,
    /// UTC calendar day → counts.
    #[serde(default)]
    pub emotions_by_day: BTreeMap<NaiveDate, EmotionCounts>,
    /// UTC hour of day (0-23) → counts.
    #[serde(default)]
    pub emotions_by_hour: BTreeMap<u32, EmotionCounts>,
}

impl TimelineStats {
    /// Number of entries the stats have absorbed, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.emotion_counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.emotion_counts.is_empty()
    }
}

/// Fold one appended entry into the stats.
///
/// `n` is the total entry count after the append.
pub fn update(mut stats: TimelineStats, entry: &EmotionEntry, n: u64) -> TimelineStats {
    let n = n.max(1);

    *stats.emotion_counts.entry(entry.emotion.clone()).or_insert(0) += 1;

    stats.average_intensity =
        (stats.average_intensity * (n - 1) as f64 + entry.intensity) / n as f64;

    stats.most_frequent = most_frequent(&stats.emotion_counts);

    let day = entry.timestamp.date_naive();
    *stats
        .emotions_by_day
        .entry(day)
        .or_default()
        .entry(entry.emotion.clone())
        .or_insert(0) += 1;

    let hour = entry.timestamp.hour();
    *stats
        .emotions_by_hour
        .entry(hour)
        .or_default()
        .entry(entry.emotion.clone())
        .or_insert(0) += 1;

    stats
}

/// Tag with the highest count. Ties go to the lexicographically smallest tag.
pub fn most_frequent(counts: &EmotionCounts) -> Option<Emotion> {
    let mut best: Option<(&Emotion, u64)> = None;
    for (emotion, &count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((emotion, count)),
        }
    }
    best.map(|(emotion, _)| emotion.clone())
}

/// Recompute stats from scratch by replaying `update` in order.
pub fn rebuild(entries: &[EmotionEntry]) -> TimelineStats {
    entries
        .iter()
        .enumerate()
        .fold(TimelineStats::default(), |stats, (i, entry)| {
            update(stats, entry, i as u64 + 1)
        })
}
