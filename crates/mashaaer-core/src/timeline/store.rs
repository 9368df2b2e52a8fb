//! Owner of the live timeline document.
//!
//! Every mutation lands in memory first and is then written through to both
//! storage tiers. Write failures are logged and never roll back the
//! in-memory document, which stays authoritative for the session.

use chrono::Utc;

use crate::emotion::EmotionEntry;
use crate::storage::KeyValueStore;
use crate::timeline::analysis::EmotionPattern;
use crate::timeline::document::TimelineDocument;
use crate::timeline::stats;

/// Where `load` found the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Secondary,
    Fresh,
}

/// Per-tier result of a save. `primary` is `None` when no cache is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub primary: Option<bool>,
    pub secondary: bool,
}

impl SaveOutcome {
    pub fn is_complete(&self) -> bool {
        self.secondary && self.primary.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    pub total_entries: usize,
    pub evicted: usize,
    pub patterns_updated: bool,
    pub saved: SaveOutcome,
}

pub struct TimelineStore {
    key: String,
    primary: Option<Box<dyn KeyValueStore>>,
    secondary: Box<dyn KeyValueStore>,
    doc: TimelineDocument,
    source: LoadSource,
    max_entries: usize,
}

impl TimelineStore {
    /// Load the document under `key`, trying the cache before the
    /// persistent store. Never fails: unreadable data yields a fresh document.
    pub fn load(
        key: &str,
        primary: Option<Box<dyn KeyValueStore>>,
        secondary: Box<dyn KeyValueStore>,
    ) -> Self {
        let mut store = Self {
            key: key.to_string(),
            primary,
            secondary,
            doc: TimelineDocument::new(),
            source: LoadSource::Fresh,
            max_entries: 0,
        };

        if let Some(doc) = store.primary.as_deref().and_then(|kv| read_tier(kv, key)) {
            store.doc = doc;
            store.source = LoadSource::Primary;
        } else if let Some(doc) = read_tier(store.secondary.as_ref(), key) {
            store.doc = doc;
            store.source = LoadSource::Secondary;
        }

        tracing::debug!(
            key,
            source = ?store.source,
            entries = store.doc.entries.len(),
            "Emotion timeline loaded"
        );
        store
    }

    /// Cap stored entries; 0 disables eviction.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// Read-only view of the live document.
    pub fn document(&self) -> &TimelineDocument {
        &self.doc
    }

    /// Owned copy of the live document.
    pub fn snapshot(&self) -> TimelineDocument {
        self.doc.clone()
    }

    pub fn append(&mut self, entry: EmotionEntry) -> AppendOutcome {
        self.append_with(entry, |_| None)
    }

    /// Append, update stats, optionally refresh patterns, then persist.
    ///
    /// `refresh` sees the document after the entry and stats are in place
    /// and may return a new pattern list.
    pub fn append_with<F>(&mut self, entry: EmotionEntry, refresh: F) -> AppendOutcome
    where
        F: FnOnce(&TimelineDocument) -> Option<Vec<EmotionPattern>>,
    {
        let n = self.doc.stats.total_recorded() + 1;
        let current = std::mem::take(&mut self.doc.stats);
        self.doc.stats = stats::update(current, &entry, n);
        self.doc.entries.push(entry);

        let evicted = self.evict();

        let patterns_updated = match refresh(&self.doc) {
            Some(patterns) => {
                self.doc.patterns = patterns;
                true
            }
            None => false,
        };

        self.doc.last_updated = Utc::now();
        let saved = self.save();

        AppendOutcome {
            total_entries: self.doc.entries.len(),
            evicted,
            patterns_updated,
            saved,
        }
    }

    fn evict(&mut self) -> usize {
        if self.max_entries == 0 || self.doc.entries.len() <= self.max_entries {
            return 0;
        }
        let excess = self.doc.entries.len() - self.max_entries;
        self.doc.entries.drain(..excess);
        excess
    }

    /// Write the document to every tier. Best-effort.
    pub fn save(&self) -> SaveOutcome {
        let raw = match serde_json::to_string(&self.doc) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Error serializing emotion timeline data");
                return SaveOutcome {
                    primary: self.primary.as_ref().map(|_| false),
                    secondary: false,
                };
            }
        };

        let secondary = write_tier(self.secondary.as_ref(), &self.key, &raw);
        let primary = self
            .primary
            .as_deref()
            .map(|kv| write_tier(kv, &self.key, &raw));

        SaveOutcome { primary, secondary }
    }
}

fn read_tier(kv: &dyn KeyValueStore, key: &str) -> Option<TimelineDocument> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(tier = kv.name(), error = %e, "Error reading emotion timeline data");
            return None;
        }
    };

    match TimelineDocument::from_json(&raw) {
        Ok((doc, report)) => {
            if !report.is_clean() {
                tracing::warn!(tier = kv.name(), ?report, "Repaired emotion timeline data");
            }
            Some(doc)
        }
        Err(e) => {
            tracing::error!(tier = kv.name(), error = %e, "Error parsing emotion timeline data");
            None
        }
    }
}

fn write_tier(kv: &dyn KeyValueStore, key: &str, raw: &str) -> bool {
    match kv.set(key, raw) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(tier = kv.name(), error = %e, "Error saving emotion timeline data");
            false
        }
    }
}
