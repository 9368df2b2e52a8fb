//! Pattern recognition over a window of entries.
//!
//! Produces emotion transitions, a stability score, valence-change events and
//! an overall trend. The results are stored in the document's `patterns`
//! field for tiers that include `emotionPatternRecognition`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::emotion::{Emotion, EmotionEntry};
use crate::timeline::stats::{most_frequent, EmotionCounts};

/// Default valence jump that counts as a significant event.
pub const DEFAULT_SIGNIFICANT_EVENT_THRESHOLD: f64 = 0.7;

/// Half-to-half valence difference below which the trend is flat.
const TREND_FLAT_BAND: f64 = 0.3;

/// Positivity of an emotion in [-1, 1]. Unknown tags are neutral.
pub fn valence(emotion: &Emotion) -> f64 {
    match emotion.as_str() {
        "happy" => 1.0,
        "confident" => 0.8,
        "surprised" => 0.3,
        "neutral" => 0.0,
        "anxious" => -0.7,
        "angry" => -0.8,
        "sad" => -1.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Stable,
    Fluctuating,
    Improving,
    Deteriorating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

/// One recognised pattern, as persisted in the timeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EmotionPattern {
    Summary {
        dominant_emotion: Option<Emotion>,
        average_valence: f64,
        stability: f64,
        trend: Trend,
        entry_count: usize,
    },
    Transition {
        from: Emotion,
        to: Emotion,
        count: u64,
    },
    SignificantEvent {
        timestamp: DateTime<Utc>,
        emotion: Emotion,
        valence_change: f64,
        direction: Direction,
    },
}

/// Full analysis of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub entry_count: usize,
    pub dominant_emotion: Option<Emotion>,
    pub average_valence: f64,
    pub stability: f64,
    pub trend: Trend,
    pub transitions: BTreeMap<Emotion, BTreeMap<Emotion, u64>>,
    pub significant_events: Vec<EmotionPattern>,
}

impl PatternReport {
    /// Flatten into the persisted pattern list: summary first, then
    /// transitions in tag order, then significant events in time order.
    pub fn into_patterns(self) -> Vec<EmotionPattern> {
        let mut patterns = vec![EmotionPattern::Summary {
            dominant_emotion: self.dominant_emotion,
            average_valence: self.average_valence,
            stability: self.stability,
            trend: self.trend,
            entry_count: self.entry_count,
        }];
        for (from, targets) in self.transitions {
            for (to, count) in targets {
                patterns.push(EmotionPattern::Transition {
                    from: from.clone(),
                    to,
                    count,
                });
            }
        }
        patterns.extend(self.significant_events);
        patterns
    }
}

#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    threshold: f64,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNIFICANT_EVENT_THRESHOLD)
    }
}

impl PatternAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn analyze(&self, entries: &[EmotionEntry]) -> PatternReport {
        let valences: Vec<f64> = entries.iter().map(|e| valence(&e.emotion)).collect();
        let average_valence = if valences.is_empty() {
            0.0
        } else {
            valences.iter().sum::<f64>() / valences.len() as f64
        };

        let mut counts = EmotionCounts::new();
        for e in entries {
            *counts.entry(e.emotion.clone()).or_insert(0) += 1;
        }

        PatternReport {
            entry_count: entries.len(),
            dominant_emotion: most_frequent(&counts),
            average_valence,
            stability: stability(entries),
            trend: trend(entries, &valences),
            transitions: transitions(entries),
            significant_events: self.significant_events(entries, &valences),
        }
    }

    fn significant_events(&self, entries: &[EmotionEntry], valences: &[f64]) -> Vec<EmotionPattern> {
        entries
            .iter()
            .zip(valences.iter())
            .collect::<Vec<_>>()
            .windows(2)
            .filter_map(|pair| {
                let (_, prev) = pair[0];
                let (entry, curr) = pair[1];
                let change = (curr - prev).abs();
                (change >= self.threshold).then(|| EmotionPattern::SignificantEvent {
                    timestamp: entry.timestamp,
                    emotion: entry.emotion.clone(),
                    valence_change: change,
                    direction: if curr > prev {
                        Direction::Positive
                    } else {
                        Direction::Negative
                    },
                })
            })
            .collect()
    }
}

/// Source → target → count over consecutive entries.
pub fn transitions(entries: &[EmotionEntry]) -> BTreeMap<Emotion, BTreeMap<Emotion, u64>> {
    let mut out: BTreeMap<Emotion, BTreeMap<Emotion, u64>> = BTreeMap::new();
    for pair in entries.windows(2) {
        *out.entry(pair[0].emotion.clone())
            .or_default()
            .entry(pair[1].emotion.clone())
            .or_insert(0) += 1;
    }
    out
}

/// 1.0 when the emotion never changes, 0.0 when it changes on every entry.
pub fn stability(entries: &[EmotionEntry]) -> f64 {
    if entries.len() < 2 {
        return 1.0;
    }
    let changes = entries
        .windows(2)
        .filter(|pair| pair[0].emotion != pair[1].emotion)
        .count();
    1.0 - changes as f64 / (entries.len() - 1) as f64
}

fn trend(entries: &[EmotionEntry], valences: &[f64]) -> Trend {
    if valences.len() < 3 {
        return Trend::InsufficientData;
    }

    let half = valences.len() / 2;
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let first = mean(&valences[..half]);
    let second = mean(&valences[half..]);

    if (second - first).abs() < TREND_FLAT_BAND {
        let recent: BTreeSet<&Emotion> = entries
            .iter()
            .rev()
            .take(5)
            .map(|e| &e.emotion)
            .collect();
        if recent.len() >= 3 {
            Trend::Fluctuating
        } else {
            Trend::Stable
        }
    } else if second > first {
        Trend::Improving
    } else {
        Trend::Deteriorating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(tags: &[&str]) -> Vec<EmotionEntry> {
        let start = Utc::now() - Duration::hours(tags.len() as i64);
        tags.iter()
            .enumerate()
            .map(|(i, t)| EmotionEntry::at((*t).into(), 0.5, start + Duration::hours(i as i64)))
            .collect()
    }

    #[test]
    fn stability_counts_changes() {
        assert_eq!(stability(&series(&["happy"])), 1.0);
        assert_eq!(stability(&series(&["happy", "happy", "happy"])), 1.0);
        assert_eq!(stability(&series(&["happy", "sad", "happy"])), 0.0);
        assert!((stability(&series(&["happy", "happy", "sad"])) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn transitions_count_consecutive_pairs() {
        let t = transitions(&series(&["happy", "sad", "happy", "sad"]));
        assert_eq!(t[&Emotion::from("happy")][&Emotion::from("sad")], 2);
        assert_eq!(t[&Emotion::from("sad")][&Emotion::from("happy")], 1);
    }

    #[test]
    fn trend_detection() {
        let analyzer = PatternAnalyzer::default();
        assert_eq!(analyzer.analyze(&series(&["sad", "happy"])).trend, Trend::InsufficientData);
        assert_eq!(
            analyzer.analyze(&series(&["sad", "sad", "happy", "happy"])).trend,
            Trend::Improving
        );
        assert_eq!(
            analyzer.analyze(&series(&["happy", "happy", "sad", "angry"])).trend,
            Trend::Deteriorating
        );
        assert_eq!(
            analyzer.analyze(&series(&["neutral", "neutral", "neutral"])).trend,
            Trend::Stable
        );
        assert_eq!(
            analyzer.analyze(&series(&["neutral", "surprised", "nostalgic", "neutral"])).trend,
            Trend::Fluctuating
        );
    }

    #[test]
    fn significant_events_respect_threshold() {
        let report = PatternAnalyzer::default().analyze(&series(&["happy", "sad", "neutral", "neutral"]));
        assert_eq!(report.significant_events.len(), 2);
        match &report.significant_events[0] {
            EmotionPattern::SignificantEvent { emotion, direction, valence_change, .. } => {
                assert_eq!(emotion.as_str(), "sad");
                assert_eq!(*direction, Direction::Negative);
                assert!((valence_change - 2.0).abs() < 1e-12);
            }
            other => panic!("unexpected pattern {other:?}"),
        }
        match &report.significant_events[1] {
            EmotionPattern::SignificantEvent { direction, .. } => {
                assert_eq!(*direction, Direction::Positive)
            }
            other => panic!("unexpected pattern {other:?}"),
        }
    }

    #[test]
    fn patterns_start_with_summary() {
        let patterns = PatternAnalyzer::default()
            .analyze(&series(&["happy", "happy", "sad"]))
            .into_patterns();
        assert!(matches!(
            patterns[0],
            EmotionPattern::Summary { entry_count: 3, .. }
        ));
        let json = serde_json::to_value(&patterns[0]).unwrap();
        assert_eq!(json["kind"], "summary");
        assert_eq!(json["dominantEmotion"], "happy");
    }

    #[test]
    fn empty_window_is_neutral() {
        let report = PatternAnalyzer::default().analyze(&[]);
        assert_eq!(report.entry_count, 0);
        assert_eq!(report.dominant_emotion, None);
        assert_eq!(report.average_valence, 0.0);
        assert_eq!(report.stability, 1.0);
        assert_eq!(report.trend, Trend::InsufficientData);
    }
}
