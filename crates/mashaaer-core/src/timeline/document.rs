//! The persisted timeline aggregate and its shape repair.
//!
//! Documents written by older builds, or edited by hand, are coerced back
//! into shape instead of being rejected. Repair works on raw JSON so that a
//! single bad field does not discard the rest of the document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::emotion::EmotionEntry;
use crate::timeline::analysis::EmotionPattern;
use crate::timeline::stats::{self, TimelineStats};

/// Stats keys every document must carry.
const REQUIRED_STATS_FIELDS: [&str; 3] = ["mostFrequent", "averageIntensity", "emotionCounts"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDocument {
    /// Arrival order, oldest first.
    pub entries: Vec<EmotionEntry>,
    pub stats: TimelineStats,
    pub patterns: Vec<EmotionPattern>,
    pub last_updated: DateTime<Utc>,
}

impl TimelineDocument {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stats: TimelineStats::default(),
            patterns: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[EmotionEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Parse and repair a stored document.
    pub fn from_json(raw: &str) -> Result<(Self, RepairReport), serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(validate(value))
    }
}

impl Default for TimelineDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// What `validate` had to change. Empty when the input was already valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub replaced_document: bool,
    pub reset_entries: bool,
    pub dropped_entries: usize,
    pub reset_stats: bool,
    pub rebuilt_stats: bool,
    pub defaulted_stats_fields: Vec<&'static str>,
    pub reset_patterns: bool,
    pub dropped_patterns: usize,
    pub defaulted_last_updated: bool,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == RepairReport::default()
    }
}

/// Coerce a stored value into a well-formed document.
pub fn validate(value: Value) -> (TimelineDocument, RepairReport) {
    let mut report = RepairReport::default();

    let mut obj = match value {
        Value::Object(obj) => obj,
        _ => {
            report.replaced_document = true;
            return (TimelineDocument::new(), report);
        }
    };

    let entries = repair_entries(obj.remove("entries"), &mut report);
    let stats = repair_stats(obj.remove("stats"), &entries, &mut report);
    let patterns = repair_patterns(obj.remove("patterns"), &mut report);

    let last_updated = obj
        .remove("lastUpdated")
        .and_then(|v| v.as_str().map(str::to_owned))
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| {
            report.defaulted_last_updated = true;
            Utc::now()
        });

    let doc = TimelineDocument {
        entries,
        stats,
        patterns,
        last_updated,
    };
    (doc, report)
}

fn repair_entries(value: Option<Value>, report: &mut RepairReport) -> Vec<EmotionEntry> {
    let Some(Value::Array(items)) = value else {
        report.reset_entries = true;
        return Vec::new();
    };

    let total = items.len();
    let entries: Vec<EmotionEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    report.dropped_entries = total - entries.len();
    entries
}

fn repair_stats(
    value: Option<Value>,
    entries: &[EmotionEntry],
    report: &mut RepairReport,
) -> TimelineStats {
    let rebuild_or_reset = |report: &mut RepairReport| {
        if entries.is_empty() {
            report.reset_stats = true;
            TimelineStats::default()
        } else {
            report.rebuilt_stats = true;
            stats::rebuild(entries)
        }
    };

    let Some(Value::Object(obj)) = value else {
        return rebuild_or_reset(report);
    };

    report.defaulted_stats_fields = REQUIRED_STATS_FIELDS
        .iter()
        .copied()
        .filter(|field| !obj.contains_key(*field))
        .collect();

    let missing_counts = !obj.contains_key("emotionCounts");
    let missing_average = !obj.contains_key("averageIntensity");
    let recompute_most_frequent = !obj.contains_key("mostFrequent");
    // running stats without counts or average cannot continue from entries
    if !entries.is_empty() && (missing_counts || missing_average) {
        return rebuild_or_reset(report);
    }

    match serde_json::from_value::<TimelineStats>(Value::Object(obj)) {
        Ok(mut parsed) => {
            if recompute_most_frequent {
                parsed.most_frequent = stats::most_frequent(&parsed.emotion_counts);
            }
            parsed
        }
        Err(_) => rebuild_or_reset(report),
    }
}

fn repair_patterns(value: Option<Value>, report: &mut RepairReport) -> Vec<EmotionPattern> {
    let Some(Value::Array(items)) = value else {
        report.reset_patterns = true;
        return Vec::new();
    };

    let total = items.len();
    let patterns: Vec<EmotionPattern> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    report.dropped_patterns = total - patterns.len();
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TimelineDocument {
        let mut doc = TimelineDocument::new();
        let ts = DateTime::parse_from_rfc3339("2025-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        doc.entries.push(EmotionEntry::at("happy".into(), 0.8, ts));
        doc.entries.push(EmotionEntry::at("sad".into(), 0.4, ts));
        doc.stats = stats::rebuild(&doc.entries);
        doc
    }

    #[test]
    fn validating_valid_document_changes_nothing() {
        let doc = sample();
        let (repaired, report) = validate(serde_json::to_value(&doc).unwrap());
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(repaired, doc);
    }

    #[test]
    fn non_object_is_replaced() {
        let (doc, report) = validate(json!([1, 2, 3]));
        assert!(report.replaced_document);
        assert!(doc.entries.is_empty());
        assert!(doc.stats.is_empty());
    }

    #[test]
    fn missing_fields_are_backfilled() {
        let (doc, report) = validate(json!({}));
        assert!(report.reset_entries);
        assert!(report.reset_stats);
        assert!(report.reset_patterns);
        assert!(report.defaulted_last_updated);
        assert!(doc.entries.is_empty());
        assert_eq!(doc.stats.average_intensity, 0.0);
    }

    #[test]
    fn non_array_entries_become_empty() {
        let (doc, report) = validate(json!({
            "entries": "oops",
            "stats": {"mostFrequent": null, "averageIntensity": 0, "emotionCounts": {}},
            "patterns": [],
            "lastUpdated": "2025-05-01T10:00:00Z"
        }));
        assert!(report.reset_entries);
        assert!(doc.entries.is_empty());
        assert!(!report.reset_stats);
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let (doc, report) = validate(json!({
            "entries": [
                {"emotion": "happy", "intensity": 0.8, "timestamp": "2025-05-01T10:00:00Z"},
                {"emotion": "sad"},
                42
            ],
            "stats": {"mostFrequent": "happy", "averageIntensity": 0.8, "emotionCounts": {"happy": 1}},
            "patterns": [],
            "lastUpdated": "2025-05-01T10:00:00Z"
        }));
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(report.dropped_entries, 2);
    }

    #[test]
    fn missing_stats_are_rebuilt_from_entries() {
        let (doc, report) = validate(json!({
            "entries": [
                {"emotion": "happy", "intensity": 0.8, "timestamp": "2025-05-01T10:00:00Z"},
                {"emotion": "sad", "intensity": 0.4, "timestamp": "2025-05-01T11:00:00Z"}
            ],
            "stats": "broken",
            "patterns": [],
            "lastUpdated": "2025-05-01T10:00:00Z"
        }));
        assert!(report.rebuilt_stats);
        assert_eq!(doc.stats.total_recorded(), 2);
        assert!((doc.stats.average_intensity - 0.6).abs() < 1e-9);
    }

    #[test]
    fn partial_stats_get_defaults() {
        let (doc, report) = validate(json!({
            "entries": [],
            "stats": {"averageIntensity": 0.5},
            "patterns": [],
            "lastUpdated": "2025-05-01T10:00:00Z"
        }));
        assert_eq!(report.defaulted_stats_fields, vec!["mostFrequent", "emotionCounts"]);
        assert_eq!(doc.stats.average_intensity, 0.5);
        assert!(doc.stats.emotion_counts.is_empty());
    }

    #[test]
    fn partial_stats_with_entries_are_rebuilt() {
        let (doc, report) = validate(json!({
            "entries": [
                {"emotion": "happy", "intensity": 0.8, "timestamp": "2025-05-01T10:00:00Z"},
                {"emotion": "happy", "intensity": 0.8, "timestamp": "2025-05-01T11:00:00Z"}
            ],
            "stats": {"averageIntensity": 0.8},
            "patterns": [],
            "lastUpdated": "2025-05-01T11:00:00Z"
        }));
        assert!(report.rebuilt_stats);
        assert_eq!(doc.stats.total_recorded(), 2);
        assert_eq!(doc.stats.most_frequent.as_ref().map(|e| e.as_str()), Some("happy"));
        assert!((doc.stats.average_intensity - 0.8).abs() < 1e-9);
    }

    #[test]
    fn missing_most_frequent_is_recomputed_from_counts() {
        let (doc, report) = validate(json!({
            "entries": [
                {"emotion": "sad", "intensity": 0.4, "timestamp": "2025-05-01T10:00:00Z"}
            ],
            "stats": {"averageIntensity": 0.4, "emotionCounts": {"sad": 3, "happy": 1}},
            "patterns": [],
            "lastUpdated": "2025-05-01T10:00:00Z"
        }));
        assert_eq!(report.defaulted_stats_fields, vec!["mostFrequent"]);
        assert!(!report.rebuilt_stats);
        assert_eq!(doc.stats.total_recorded(), 4);
        assert_eq!(doc.stats.most_frequent.as_ref().map(|e| e.as_str()), Some("sad"));
    }

    #[test]
    fn unparsable_last_updated_defaults_to_now() {
        let before = Utc::now();
        let (doc, report) = validate(json!({
            "entries": [], "stats": {}, "patterns": [], "lastUpdated": "yesterday"
        }));
        assert!(report.defaulted_last_updated);
        assert!(doc.last_updated >= before);
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let doc = sample();
        assert_eq!(doc.recent(1)[0].emotion.as_str(), "sad");
        assert_eq!(doc.recent(50).len(), 2);
    }
}
