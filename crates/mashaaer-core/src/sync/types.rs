//! Core types for timeline sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::emotion::EmotionEntry;
use crate::timeline::TimelineStats;

/// Request body POSTed to the sync endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    /// Most recent entries, oldest first.
    pub entries: Vec<EmotionEntry>,
    pub stats: TimelineStats,
    pub last_updated: DateTime<Utc>,
    pub cultural_context: String,
}

/// Why a sync round sent nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoEndpoint,
    NotEntitled,
    NoRuntime,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NoEndpoint => "no sync endpoint configured",
            SkipReason::NotEntitled => "emotionExport not included in subscription",
            SkipReason::NoRuntime => "no async runtime available",
        })
    }
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {status}")]
    Http { status: u16 },

    #[error("Invalid sync endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Could not decode server response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Http {
                status: status.as_u16(),
            }
        } else {
            SyncError::Network(err.to_string())
        }
    }
}
