//! Property tests for the running stats aggregator.

use chrono::{Duration, TimeZone, Utc};
use mashaaer_core::timeline::stats;
use mashaaer_core::{EmotionEntry, MemoryCache, TimelineStats, TimelineStore};
use proptest::prelude::*;

const TAGS: [&str; 8] = [
    "happy", "sad", "angry", "surprised", "neutral", "anxious", "confident", "bored",
];

fn arb_entries() -> impl Strategy<Value = Vec<EmotionEntry>> {
    prop::collection::vec((0..TAGS.len(), 0.0f64..=1.0, 0i64..500_000), 1..120).prop_map(|raw| {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        raw.into_iter()
            .map(|(tag, intensity, minutes)| {
                EmotionEntry::at(TAGS[tag].into(), intensity, base + Duration::minutes(minutes))
            })
            .collect()
    })
}

fn fold(entries: &[EmotionEntry]) -> TimelineStats {
    entries
        .iter()
        .enumerate()
        .fold(TimelineStats::default(), |acc, (i, entry)| {
            stats::update(acc, entry, i as u64 + 1)
        })
}

proptest! {
    /// Property: the incremental mean equals the arithmetic mean
    #[test]
    fn prop_average_is_arithmetic_mean(entries in arb_entries()) {
        let stats = fold(&entries);
        let mean = entries.iter().map(|e| e.intensity).sum::<f64>() / entries.len() as f64;
        prop_assert!((stats.average_intensity - mean).abs() < 1e-9);
    }

    /// Property: replaying entries gives the stats the store built incrementally
    #[test]
    fn prop_rebuild_matches_store_appends(entries in arb_entries()) {
        let mut store = TimelineStore::load("k", None, Box::new(MemoryCache::new()));
        for entry in &entries {
            store.append(entry.clone());
        }
        prop_assert_eq!(&store.document().stats, &stats::rebuild(&entries));
    }

    /// Property: counts sum to the number of entries, in every bucket view
    #[test]
    fn prop_bucket_totals_agree(entries in arb_entries()) {
        let stats = fold(&entries);
        let n = entries.len() as u64;
        prop_assert_eq!(stats.total_recorded(), n);
        let by_day: u64 = stats.emotions_by_day.values().flat_map(|c| c.values()).sum();
        let by_hour: u64 = stats.emotions_by_hour.values().flat_map(|c| c.values()).sum();
        prop_assert_eq!(by_day, n);
        prop_assert_eq!(by_hour, n);
        prop_assert!(stats.emotions_by_hour.keys().all(|h| *h < 24));
    }

    /// Property: the most frequent tag has the maximum count
    #[test]
    fn prop_most_frequent_has_max_count(entries in arb_entries()) {
        let stats = fold(&entries);
        let top = stats.most_frequent.clone().unwrap();
        let max = *stats.emotion_counts.values().max().unwrap();
        prop_assert_eq!(stats.emotion_counts[&top], max);
        let first_with_max = stats
            .emotion_counts
            .iter()
            .find(|(_, c)| **c == max)
            .map(|(e, _)| e.clone());
        prop_assert_eq!(Some(top), first_with_max);
    }
}
