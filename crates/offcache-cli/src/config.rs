//! CLI configuration management.
//!
//! Settings are stored at `~/.config/offcache/config.json`; every field is
//! optional and falls back to the compiled-in deployment defaults. After
//! loading, `OFFCACHE_*` environment variables override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use offcache_core::{config::default_store_dir, CacheConfig};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "offcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_VERSION: &str = "OFFCACHE_VERSION";
const ENV_BASE_URL: &str = "OFFCACHE_BASE_URL";
const ENV_CACHE_DIR: &str = "OFFCACHE_CACHE_DIR";
const ENV_LOG_FILE: &str = "OFFCACHE_LOG_FILE";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub assets: Option<Vec<String>>,
    pub cache_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment-style overrides; empty values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(version) = lookup(ENV_VERSION) {
            self.version = Some(version);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(file));
        }
        self
    }

    /// Log file named by the environment alone, for when the config file
    /// itself cannot be loaded
    pub fn log_file_from_env() -> Option<PathBuf> {
        Self::default()
            .with_overrides(|key| std::env::var(key).ok())
            .log_file
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Deployment settings, with compiled-in defaults for anything unset
    pub fn cache_config(&self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            version: self.version.clone().unwrap_or(defaults.version),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            assets: self.assets.clone().unwrap_or(defaults.assets),
        }
    }

    pub fn store_dir(&self) -> Result<PathBuf> {
        match self.cache_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(default_store_dir()?),
        }
    }
}
