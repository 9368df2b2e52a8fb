//! # Mashaaer Core Library
//!
//! This library provides the emotion timeline behind Mashaaer: every emotion
//! the detector observes is recorded, aggregated into running statistics,
//! persisted, optionally pushed to a sync endpoint and projected for display.
//! The `mashaaer` CLI is a thin front end over the same library.
//!
//! ## Architecture
//!
//! - **Access**: static subscription-tier → feature table
//! - **Timeline**: the persisted document, O(1) stats aggregation, history
//!   windows and pattern recognition
//! - **Storage**: two key-value tiers (in-process cache, SQLite) and TOML
//!   configuration
//! - **Sync**: best-effort, fire-and-forget push of recent entries
//! - **Presentation**: colour/emoji tables and the newest-first list view
//!
//! ## Key Components
//!
//! - [`EmotionTimeline`]: ingestion facade wiring store, gate and sync
//! - [`TimelineStore`]: owner of the live document
//! - [`AccessGate`]: feature permissions for the current tier
//! - [`SyncAdapter`]: gated sync dispatch
//! - [`Config`]: application configuration management

pub mod access;
pub mod emotion;
pub mod error;
pub mod events;
pub mod ingest;
pub mod presentation;
pub mod storage;
pub mod sync;
pub mod timeline;

pub use access::{can_access_feature, AccessGate, Feature, SubscriptionLevel};
pub use emotion::{Emotion, EmotionEntry};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, EventBus, Signal, Subscription};
pub use ingest::{EmotionTimeline, RecordOutcome};
pub use presentation::{flow, render, FlowSeries, LiveView, TimelineView};
pub use storage::{Config, KeyValueStore, MemoryCache, SqliteStore};
pub use sync::{SyncAdapter, SyncDispatch, SyncError};
pub use timeline::{
    EmotionPattern, PatternAnalyzer, TimePeriod, TimelineDocument, TimelineStats, TimelineStore,
};
