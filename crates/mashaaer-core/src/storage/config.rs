//! TOML-based application configuration.
//!
//! Stores the inputs the timeline is initialised with:
//! - Subscription level and cultural context
//! - Storage key and optional sync endpoint
//! - Retention, sync and pattern-analysis tuning
//!
//! Configuration is stored at `~/.config/mashaaer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::access::SubscriptionLevel;
use crate::error::ConfigError;
use crate::timeline::analysis::DEFAULT_SIGNIFICANT_EVENT_THRESHOLD;
use crate::timeline::TimePeriod;

/// Count-based retention for stored entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Oldest entries beyond this count are evicted. 0 keeps everything.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Remote sync tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of most recent entries pushed per sync.
    #[serde(default = "default_sync_window")]
    pub window: usize,
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,
}

/// Pattern recognition tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold")]
    pub significant_event_threshold: f64,
    /// One of day, week, month, quarter.
    #[serde(default = "default_period")]
    pub default_period: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mashaaer/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub subscription_level: SubscriptionLevel,
    #[serde(default = "default_cultural_context")]
    pub cultural_context: String,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Sync endpoint. Sync is disabled while unset.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

// Default functions
fn default_cultural_context() -> String {
    "neutral".into()
}
fn default_storage_key() -> String {
    "emotion-timeline-data".into()
}
fn default_max_entries() -> usize {
    1000
}
fn default_sync_window() -> usize {
    50
}
fn default_sync_timeout() -> u64 {
    10
}
fn default_threshold() -> f64 {
    DEFAULT_SIGNIFICANT_EVENT_THRESHOLD
}
fn default_period() -> String {
    "week".into()
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window: default_sync_window(),
            timeout_secs: default_sync_timeout(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significant_event_threshold: default_threshold(),
            default_period: default_period(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subscription_level: SubscriptionLevel::default(),
            cultural_context: default_cultural_context(),
            storage_key: default_storage_key(),
            api_endpoint: None,
            retention: RetentionConfig::default(),
            sync: SyncConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // empty input clears optional values
                    serde_json::Value::Null | serde_json::Value::String(_) if value.is_empty() => {
                        serde_json::Value::Null
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values serde accepts but the timeline cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.api_endpoint {
            url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
                key: "api_endpoint".into(),
                message: e.to_string(),
            })?;
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage_key".into(),
                message: "must not be empty".into(),
            });
        }
        self.analysis
            .default_period
            .parse::<TimePeriod>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "analysis.default_period".into(),
                message: e.to_string(),
            })?;
        if self.sync.window == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sync.window".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.sync.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sync.timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        let threshold = self.analysis.significant_event_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.significant_event_threshold".into(),
                message: format!("must be a non-negative number, got {threshold}"),
            });
        }
        Ok(())
    }

    /// The configured default analysis window.
    pub fn default_period(&self) -> TimePeriod {
        self.analysis
            .default_period
            .parse()
            .unwrap_or(TimePeriod::Week)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(!toml_str.contains("api_endpoint"));
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.subscription_level, SubscriptionLevel::Free);
        assert_eq!(cfg.cultural_context, "neutral");
        assert_eq!(cfg.storage_key, "emotion-timeline-data");
        assert_eq!(cfg.api_endpoint, None);
        assert_eq!(cfg.retention.max_entries, 1000);
        assert_eq!(cfg.sync.window, 50);
        assert_eq!(cfg.default_period(), TimePeriod::Week);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            subscription_level = "premium"
            api_endpoint = "https://example.com/api/timeline"

            [sync]
            window = 20
            "#,
        )
        .unwrap();
        assert_eq!(cfg.subscription_level, SubscriptionLevel::Premium);
        assert_eq!(cfg.sync.window, 20);
        assert_eq!(cfg.sync.timeout_secs, 10);
        assert_eq!(cfg.storage_key, "emotion-timeline-data");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("subscription_level").as_deref(), Some("free"));
        assert_eq!(cfg.get("sync.window").as_deref(), Some("50"));
        assert_eq!(cfg.get("api_endpoint").as_deref(), Some("null"));
        assert!(cfg.get("sync.missing_key").is_none());
    }

    #[test]
    fn apply_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.apply("subscription_level", "basic").unwrap();
        cfg.apply("retention.max_entries", "250").unwrap();
        cfg.apply("analysis.significant_event_threshold", "0.5").unwrap();
        cfg.apply("api_endpoint", "http://localhost:5000/api/timeline").unwrap();
        assert_eq!(cfg.subscription_level, SubscriptionLevel::Basic);
        assert_eq!(cfg.retention.max_entries, 250);
        assert_eq!(cfg.analysis.significant_event_threshold, 0.5);
        assert!(cfg.api_endpoint.is_some());

        cfg.apply("api_endpoint", "").unwrap();
        assert_eq!(cfg.api_endpoint, None);
    }

    #[test]
    fn apply_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("subscription_level", "gold"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("sync.window", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("api_endpoint", "not a url"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_rejects_zero_sync_settings_and_negative_threshold() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("sync.window", "0"),
            ("sync.timeout_secs", "0"),
            ("analysis.significant_event_threshold", "-0.1"),
        ] {
            match cfg.apply(key, value) {
                Err(ConfigError::InvalidValue { key: rejected, .. }) => assert_eq!(rejected, key),
                other => panic!("{key}={value} accepted: {other:?}"),
            }
        }
        assert_eq!(cfg, Config::default());

        cfg.apply("analysis.significant_event_threshold", "0").unwrap();
        cfg.apply("sync.window", "1").unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_from_rejects_zero_window_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync]\nwindow = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("cultural_context", "gulf").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().cultural_context, "gulf");
    }
}
