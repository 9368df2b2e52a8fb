//! The emotion timeline: persisted document, running stats, history windows
//! and pattern recognition.

pub mod analysis;
pub mod document;
pub mod range;
pub mod stats;
mod store;

pub use analysis::{Direction, EmotionPattern, PatternAnalyzer, PatternReport, Trend};
pub use document::{validate, RepairReport, TimelineDocument};
pub use range::{TimePeriod, BASIC_HISTORY_DAYS};
pub use stats::TimelineStats;
pub use store::{AppendOutcome, LoadSource, SaveOutcome, TimelineStore};
