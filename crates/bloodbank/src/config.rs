//! Configuration management for bloodbank.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bloodbank";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "bloodbank.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BLOODBANK_`)
/// 2. TOML config file at `~/.config/bloodbank/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Seed data configuration.
    pub seed: SeedConfig,
    /// Donor eligibility thresholds.
    pub eligibility: EligibilityConfig,
    /// Inventory stock-level thresholds.
    pub inventory: InventoryConfig,
}

/// Which key-value backend holds the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Persistent `SQLite` database.
    #[default]
    Sqlite,
    /// Process-local memory; nothing survives exit.
    Memory,
}

/// What to do when a persisted value fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log a warning and read the value as empty.
    #[default]
    Empty,
    /// Return `MalformedPersistedData`.
    Error,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to use.
    pub backend: Backend,
    /// Path to the database file.
    /// Defaults to `~/.local/share/bloodbank/bloodbank.db`
    pub database_path: Option<PathBuf>,
    /// Handling of unparsable persisted values.
    pub on_malformed: MalformedPolicy,
    /// Byte quota for the memory backend. Set to 0 for unlimited.
    pub quota_bytes: usize,
}

/// Seed data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Write the starter donors, recipients and inventory on first run.
    pub enabled: bool,
}

/// Donor eligibility thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Youngest eligible age in years.
    pub min_age: u32,
    /// Oldest eligible age in years.
    pub max_age: u32,
    /// Lightest eligible weight in kilograms.
    pub min_weight_kg: f64,
}

/// Inventory stock-level thresholds (units). Each bound is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Below this count a type is critical.
    pub critical_below: u32,
    /// Below this count a type is low.
    pub low_below: u32,
    /// Below this count a type is medium; otherwise high.
    pub medium_below: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 65,
            min_weight_kg: 50.0,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            critical_below: 10,
            low_below: 16,
            medium_below: 40,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("BLOODBANK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let e = &self.eligibility;
        if e.min_age > e.max_age {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_age ({}) cannot be greater than max_age ({})",
                    e.min_age, e.max_age
                ),
            });
        }

        if !(e.min_weight_kg.is_finite() && e.min_weight_kg > 0.0) {
            return Err(Error::ConfigValidation {
                message: format!("min_weight_kg must be positive, got {}", e.min_weight_kg),
            });
        }

        let i = &self.inventory;
        if !(i.critical_below <= i.low_below && i.low_below <= i.medium_below) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "inventory thresholds must ascend: critical_below ({}) <= low_below ({}) <= medium_below ({})",
                    i.critical_below, i.low_below, i.medium_below
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the memory backend quota, or `None` when unlimited.
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        match self.storage.quota_bytes {
            0 => None,
            n => Some(n),
        }
    }
}
