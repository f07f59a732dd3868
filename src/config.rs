//! Store configuration.
//!
//! The configuration is resolved once at process start and shared read-only
//! afterwards.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the dynamic SQLite store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one file per logical database.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// File extension appended to every database name.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Log level (error, warn, info, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("databases")
}

fn default_extension() -> String {
    "db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            extension: default_extension(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Converts configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database root directory.
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.root_dir = dir.into();
        self
    }

    /// Sets the database file extension (without the leading dot).
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = ext.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.root_dir, PathBuf::from("databases"));
        assert_eq!(config.extension, "db");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::builder()
            .root_dir("/srv/dbs")
            .extension("sqlite")
            .log_level("debug")
            .build();

        assert_eq!(config.root_dir, PathBuf::from("/srv/dbs"));
        assert_eq!(config.extension, "sqlite");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.toml");
        std::fs::write(&path, "root_dir = \"/data/tenants\"\n").unwrap();

        let loaded = StoreConfig::from_file(&path).unwrap();
        assert_eq!(loaded.root_dir, PathBuf::from("/data/tenants"));
        assert_eq!(loaded.extension, "db");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = StoreConfig::builder().root_dir("/tmp/x").build();
        let text = config.to_toml().unwrap();
        let parsed: StoreConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
