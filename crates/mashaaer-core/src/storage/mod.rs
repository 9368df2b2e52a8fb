//! Durable storage for the timeline document and application config.
//!
//! The timeline is written through two key-value tiers: an in-process
//! [`MemoryCache`] that serves reloads within a session, and a SQLite-backed
//! [`SqliteStore`] that survives restarts.

mod config;
pub mod database;
pub mod memory;

pub use config::{AnalysisConfig, Config, RetentionConfig, SyncConfig};
pub use database::SqliteStore;
pub use memory::MemoryCache;

use std::path::PathBuf;

use crate::error::StorageError;

/// A string key-value store holding serialized documents.
pub trait KeyValueStore: Send {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/mashaaer[-dev]/` based on MASHAAER_ENV.
///
/// Set MASHAAER_ENV=dev to use the development data directory, or
/// MASHAAER_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("MASHAAER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MASHAAER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("mashaaer-dev")
            } else {
                base_dir.join("mashaaer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
