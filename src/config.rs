// Copyright 2025 Cowboy AI, LLC.

//! Platform configuration
//!
//! Configuration is read from TOML and handed to components as constants
//! in the service graph (see [`FrameworkConfig::constants`]).

use crate::errors::{FrameworkError, FrameworkResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Constant holding the default persistence space
pub const PERSISTENCE_SPACE: &str = "PERSISTENCE_SPACE";
/// Constant holding the spaces served by the in-memory provider
pub const PERSISTENCE_SPACES: &str = "PERSISTENCE_SPACES";
/// Constant holding the queue debounce in milliseconds
pub const QUEUE_DEBOUNCE_MS: &str = "QUEUE_DEBOUNCE_MS";
/// Constant holding the per-operation timeout in milliseconds
pub const QUEUE_OPERATION_TIMEOUT_MS: &str = "QUEUE_OPERATION_TIMEOUT_MS";
/// Constant holding the maximum attempts per queued write
pub const QUEUE_MAX_ATTEMPTS: &str = "QUEUE_MAX_ATTEMPTS";
/// Constant holding the model cache capacity
pub const MODEL_CACHE_CAPACITY: &str = "MODEL_CACHE_CAPACITY";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Persistence settings
    pub persistence: PersistenceConfig,
    /// Persistence queue settings
    pub queue: QueueConfig,
    /// Model cache settings
    pub cache: CacheConfig,
    /// Bundles to load from disk
    pub bundles: BundlesConfig,
}

/// Persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Space used for identifiers without a namespace
    pub default_space: String,
    /// Spaces served by the built-in in-memory provider
    pub spaces: Vec<String>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            default_space: "mct".to_string(),
            spaces: vec!["mct".to_string()],
        }
    }
}

/// Persistence queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Delay before each queued write starts
    pub debounce_ms: u64,
    /// A write that has not settled after this long counts as failed
    pub operation_timeout_ms: u64,
    /// Attempts (first try plus user retries) before a write is discarded
    pub max_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 0,
            operation_timeout_ms: 30_000,
            max_attempts: 5,
        }
    }
}

impl QueueConfig {
    /// Debounce as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Operation timeout as a duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Model cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached models
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 4096 }
    }
}

/// Bundles to load from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlesConfig {
    /// Directory bundle paths are relative to
    pub root: Option<PathBuf>,
    /// Bundle paths, each containing a `bundle.json`
    pub list: Vec<String>,
}

impl FrameworkConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> FrameworkResult<Self> {
        let config: FrameworkConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> FrameworkResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FrameworkError::Configuration(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> FrameworkResult<()> {
        if self.persistence.default_space.is_empty() {
            return Err(FrameworkError::Configuration(
                "persistence.default_space must not be empty".to_string(),
            ));
        }
        if self.queue.max_attempts == 0 {
            return Err(FrameworkError::Configuration(
                "queue.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(FrameworkError::Configuration(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Constants exposed to the service graph
    pub fn constants(&self) -> Vec<(&'static str, Value)> {
        vec![
            (PERSISTENCE_SPACE, json!(self.persistence.default_space)),
            (PERSISTENCE_SPACES, json!(self.persistence.spaces)),
            (QUEUE_DEBOUNCE_MS, json!(self.queue.debounce_ms)),
            (
                QUEUE_OPERATION_TIMEOUT_MS,
                json!(self.queue.operation_timeout_ms),
            ),
            (QUEUE_MAX_ATTEMPTS, json!(self.queue.max_attempts)),
            (MODEL_CACHE_CAPACITY, json!(self.cache.capacity)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = FrameworkConfig::from_toml_str("").unwrap();
        assert_eq!(config, FrameworkConfig::default());
        assert_eq!(config.persistence.default_space, "mct");
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = FrameworkConfig::from_toml_str(
            r#"
            [persistence]
            default_space = "lab"
            spaces = ["lab", "archive"]

            [queue]
            debounce_ms = 10
            max_attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.persistence.spaces, vec!["lab", "archive"]);
        assert_eq!(config.queue.debounce(), Duration::from_millis(10));
        assert_eq!(config.queue.max_attempts, 2);
        assert_eq!(config.queue.operation_timeout_ms, 30_000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = FrameworkConfig::from_toml_str("[queue]\nmax_attempts = 0").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_constants_cover_settings() {
        let config = FrameworkConfig::default();
        let constants = config.constants();
        let space = constants
            .iter()
            .find(|(name, _)| *name == PERSISTENCE_SPACE)
            .map(|(_, value)| value.clone());
        assert_eq!(space, Some(json!("mct")));
    }
}
