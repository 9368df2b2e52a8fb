//! Signal ingestion and the timeline facade.
//!
//! [`EmotionTimeline`] wires the store, the access gate and the sync adapter
//! together. Collaborators are passed in explicitly; [`EmotionTimeline::open`]
//! builds the default set from a [`Config`].

use chrono::{DateTime, Utc};

use crate::access::{AccessGate, Feature, SubscriptionLevel};
use crate::emotion::{Emotion, EmotionEntry};
use crate::error::{CoreError, Result};
use crate::events::{Event, EventBus, Signal, Subscription};
use crate::presentation::{flow, FlowSeries};
use crate::storage::{Config, MemoryCache, SqliteStore};
use crate::sync::{SyncAdapter, SyncDispatch};
use crate::timeline::{
    AppendOutcome, PatternAnalyzer, PatternReport, TimePeriod, TimelineDocument, TimelineStore,
    BASIC_HISTORY_DAYS,
};

/// What one recorded observation caused.
pub struct RecordOutcome {
    pub entry: EmotionEntry,
    pub appended: AppendOutcome,
    pub sync: SyncDispatch,
}

pub struct EmotionTimeline {
    store: TimelineStore,
    gate: AccessGate,
    sync: SyncAdapter,
    analyzer: PatternAnalyzer,
    pattern_period: TimePeriod,
    events: EventBus<Event>,
}

impl EmotionTimeline {
    pub fn new(store: TimelineStore, gate: AccessGate, sync: SyncAdapter) -> Self {
        Self {
            store,
            gate,
            sync,
            analyzer: PatternAnalyzer::default(),
            pattern_period: TimePeriod::Week,
            events: EventBus::new(),
        }
    }

    /// Timeline backed by the data-dir SQLite store and a fresh memory cache.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let secondary = SqliteStore::open()?;
        let store = TimelineStore::load(
            &config.storage_key,
            Some(Box::new(MemoryCache::new())),
            Box::new(secondary),
        )
        .with_max_entries(config.retention.max_entries);
        let sync = SyncAdapter::from_config(config)?;

        Ok(Self::new(store, AccessGate::new(config.subscription_level), sync)
            .with_analyzer(PatternAnalyzer::new(config.analysis.significant_event_threshold))
            .with_pattern_period(config.default_period()))
    }

    pub fn with_analyzer(mut self, analyzer: PatternAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Window the stored patterns are computed over.
    pub fn with_pattern_period(mut self, period: TimePeriod) -> Self {
        self.pattern_period = period;
        self
    }

    /// Outbound notifications for views and loggers.
    pub fn subscribe(&mut self) -> Subscription<Event> {
        self.events.subscribe()
    }

    pub fn handle(&mut self, signal: Signal) -> Option<RecordOutcome> {
        match signal {
            Signal::EmotionObserved { emotion, intensity } => {
                Some(self.record(Emotion::from(emotion.as_str()), intensity))
            }
            Signal::TimelineViewRequested => {
                self.view_requested();
                None
            }
        }
    }

    /// Handle every pending signal in arrival order.
    pub fn drain(&mut self, signals: &Subscription<Signal>) -> Vec<RecordOutcome> {
        signals.drain().filter_map(|s| self.handle(s)).collect()
    }

    /// Record one observation stamped with the current time.
    pub fn record(&mut self, emotion: Emotion, intensity: f64) -> RecordOutcome {
        self.record_entry(EmotionEntry::observed(emotion, intensity))
    }

    /// Append an already-built entry, then refresh patterns and sync.
    pub fn record_entry(&mut self, entry: EmotionEntry) -> RecordOutcome {
        let analyze = self.gate.allows(Feature::EmotionPatternRecognition);
        let analyzer = &self.analyzer;
        let period = self.pattern_period;

        let appended = self.store.append_with(entry.clone(), |doc| {
            analyze.then(|| {
                let window = period.filter(&doc.entries, Utc::now());
                analyzer.analyze(&window).into_patterns()
            })
        });

        tracing::debug!(
            emotion = %entry.emotion,
            intensity = entry.intensity,
            total = appended.total_entries,
            "Emotion recorded"
        );

        let now = Utc::now();
        self.events.publish(Event::EntryAppended {
            entry: entry.clone(),
            total_entries: appended.total_entries,
            at: now,
        });
        if appended.evicted > 0 {
            self.events.publish(Event::EntriesEvicted {
                count: appended.evicted,
                at: now,
            });
        }
        if appended.patterns_updated {
            self.events.publish(Event::PatternsUpdated {
                pattern_count: self.store.document().patterns.len(),
                at: now,
            });
        }

        let sync = self.sync_now();
        RecordOutcome {
            entry,
            appended,
            sync,
        }
    }

    /// Start a sync round for the current document.
    pub fn sync_now(&mut self) -> SyncDispatch {
        let dispatch = self.sync.sync_with_server(self.store.document(), &self.gate);
        let at = Utc::now();
        match &dispatch {
            SyncDispatch::Dispatched { entry_count, .. } => self.events.publish(Event::SyncDispatched {
                entry_count: *entry_count,
                at,
            }),
            SyncDispatch::Skipped(reason) => self.events.publish(Event::SyncSkipped {
                reason: reason.to_string(),
                at,
            }),
        }
        dispatch
    }

    pub fn view_requested(&mut self) {
        tracing::info!(entries = self.store.document().entries.len(), "Emotion timeline viewed");
        self.events.publish(Event::ViewRequested { at: Utc::now() });
    }

    pub fn level(&self) -> SubscriptionLevel {
        self.gate.level()
    }

    /// Switch tier by name. Unknown names keep the current tier.
    pub fn set_subscription_level(&mut self, level: &str) -> bool {
        self.gate.set_level(level)
    }

    pub fn set_cultural_context(&mut self, context: &str) {
        self.sync.set_cultural_context(context);
    }

    pub fn can_access_feature(&self, feature: &str) -> bool {
        self.gate.allows_named(feature)
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn document(&self) -> &TimelineDocument {
        self.store.document()
    }

    pub fn snapshot(&self) -> TimelineDocument {
        self.store.snapshot()
    }

    /// Entries the current tier may see.
    ///
    /// Without `extendedHistory` only the last week is visible.
    pub fn visible_entries(&self, now: DateTime<Utc>) -> Vec<EmotionEntry> {
        let entries = &self.store.document().entries;
        if self.gate.allows(Feature::ExtendedHistory) {
            entries.clone()
        } else {
            TimePeriod::Week.filter(entries, now)
        }
    }

    pub fn entries_in(&self, period: TimePeriod, now: DateTime<Utc>) -> Result<Vec<EmotionEntry>> {
        self.require(period.required_feature())?;
        Ok(period.filter(&self.store.document().entries, now))
    }

    pub fn patterns(&self, period: TimePeriod, now: DateTime<Utc>) -> Result<PatternReport> {
        self.require(Feature::EmotionPatternRecognition)?;
        let entries = self.entries_in(period, now)?;
        Ok(self.analyzer.analyze(&entries))
    }

    /// Flow chart of the visible entries.
    pub fn visual_flow(&self, now: DateTime<Utc>) -> Result<FlowSeries> {
        self.require(Feature::AdvancedVisualization)?;
        Ok(flow(&self.visible_entries(now)))
    }

    /// Pretty JSON of the whole document.
    pub fn export_json(&self) -> Result<String> {
        self.require(Feature::EmotionExport)?;
        Ok(serde_json::to_string_pretty(self.store.document())?)
    }

    fn require(&self, feature: Feature) -> Result<()> {
        if self.gate.allows(feature) {
            Ok(())
        } else {
            Err(CoreError::FeatureLocked {
                feature,
                level: self.gate.level(),
            })
        }
    }
}

/// Days of history a tier sees through [`EmotionTimeline::visible_entries`].
pub fn visible_history_days(level: SubscriptionLevel) -> Option<i64> {
    if Feature::ExtendedHistory.is_available_to(level) {
        None
    } else {
        Some(BASIC_HISTORY_DAYS)
    }
}
