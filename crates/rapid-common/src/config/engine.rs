//! Engine configuration structures.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{CACHE_ROW_THRESHOLD, MAX_CACHE_ROW_THRESHOLD};
use crate::error::{RapidError, RapidResult};

/// Top-level engine configuration.
///
/// # Example
///
/// ```rust
/// use rapid_common::config::RapidConfig;
///
/// let config = RapidConfig::default();
/// assert!(config.cache.enabled);
/// assert_eq!(config.cache.row_threshold, 10_000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RapidConfig {
    /// Snapshot cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Nested-loop join configuration.
    #[serde(default)]
    pub join: JoinConfig,
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether relations may be cached at all.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of rows a cached relation may have.
    /// Default: 10000
    #[serde(default = "default_row_threshold")]
    pub row_threshold: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            row_threshold: default_row_threshold(),
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given row threshold.
    #[must_use]
    pub fn with_threshold(row_threshold: usize) -> Self {
        Self {
            row_threshold,
            ..Default::default()
        }
    }

    /// Creates a config with caching switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Nested-loop join configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Whether joins ask the snapshot cache for the inner relation.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub use_snapshot_cache: bool,

    /// Run each live inner pass in the inner source's batched-read mode,
    /// ending it when the inner side is exhausted for an outer row.
    /// Default: false
    #[serde(default)]
    pub batch_mode: bool,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            use_snapshot_cache: default_enabled(),
            batch_mode: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_row_threshold() -> usize {
    CACHE_ROW_THRESHOLD
}

impl RapidConfig {
    /// Creates a builder for configuration.
    #[must_use]
    pub fn builder() -> RapidConfigBuilder {
        RapidConfigBuilder::new()
    }

    /// Loads configuration from a TOML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`RapidConfig::validate`].
    pub fn from_file(path: &Path) -> RapidResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RapidError::invalid_config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, path: &Path) -> RapidResult<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> RapidResult<String> {
        toml::to_string_pretty(self).map_err(|e| RapidError::invalid_config(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RapidError::InvalidConfig`] if the row threshold is zero or
    /// above [`MAX_CACHE_ROW_THRESHOLD`].
    pub fn validate(&self) -> RapidResult<()> {
        if self.cache.row_threshold == 0 {
            return Err(RapidError::invalid_config(
                "cache.row_threshold must be greater than zero",
            ));
        }

        if self.cache.row_threshold > MAX_CACHE_ROW_THRESHOLD {
            return Err(RapidError::invalid_config(format!(
                "cache.row_threshold must be at most {MAX_CACHE_ROW_THRESHOLD}"
            )));
        }

        Ok(())
    }
}

/// Builder for engine configuration.
#[derive(Debug, Default)]
pub struct RapidConfigBuilder {
    config: RapidConfig,
}

impl RapidConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the snapshot cache.
    #[must_use]
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    /// Sets the cache row threshold.
    #[must_use]
    pub fn row_threshold(mut self, threshold: usize) -> Self {
        self.config.cache.row_threshold = threshold;
        self
    }

    /// Sets whether joins consult the snapshot cache.
    #[must_use]
    pub fn use_snapshot_cache(mut self, enabled: bool) -> Self {
        self.config.join.use_snapshot_cache = enabled;
        self
    }

    /// Sets join batch mode.
    #[must_use]
    pub fn batch_mode(mut self, enabled: bool) -> Self {
        self.config.join.batch_mode = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RapidConfig {
        self.config
    }
}
