//! Deployment configuration for one cache generation.
//!
//! A `CacheConfig` carries the version token that names the current
//! generation and the asset list seeded into it. Both are passed to the
//! manager explicitly so several versions can coexist in one process.

use std::path::PathBuf;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::models::normalize_key;

/// Version token of the shipped deployment. Bump per release.
pub const DEFAULT_VERSION: &str = "file-tools-cache-v1";

/// Base URL assets are resolved against when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Static assets pre-populated into every new generation
pub const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.ico",
    "/logo192.png",
    "/logo512.png",
];

/// Application name used for the default store directory
const APP_NAME: &str = "offcache";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub version: String,
    pub base_url: String,
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl CacheConfig {
    pub fn new(version: impl Into<String>, base_url: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            version: version.into(),
            base_url: base_url.into(),
            assets,
        }
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.version.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "version token must not be empty".to_string(),
            ));
        }
        self.base()?;
        Ok(())
    }

    /// Resolve the asset list against the base URL.
    ///
    /// Asset paths are taken relative to the base path, so `/index.html`
    /// under `https://host/app/` becomes `https://host/app/index.html`.
    /// Duplicates after resolution are dropped, first occurrence wins.
    pub fn resolve_assets(&self) -> Result<Vec<String>, CacheError> {
        let base = self.base()?;
        let mut resolved: Vec<String> = Vec::with_capacity(self.assets.len());

        for asset in &self.assets {
            let joined = base
                .join(asset.trim_start_matches('/'))
                .map_err(|e| CacheError::InvalidUrl(format!("{}: {}", asset, e)))?;
            let key = normalize_key(joined.as_str())?;
            if !resolved.contains(&key) {
                resolved.push(key);
            }
        }

        Ok(resolved)
    }

    fn base(&self) -> Result<Url, CacheError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|e| CacheError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

/// Default on-disk store location: `<platform cache dir>/offcache`
pub fn default_store_dir() -> Result<PathBuf, CacheError> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| CacheError::InvalidConfig("Could not find cache directory".to_string()))?;
    Ok(cache_dir.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, DEFAULT_VERSION);
        assert_eq!(config.assets.len(), DEFAULT_ASSETS.len());
    }

    #[test]
    fn test_empty_version_rejected() {
        let config = CacheConfig::new("  ", DEFAULT_BASE_URL, vec![]);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_resolve_assets_relative_to_base_path() {
        let config = CacheConfig::new(
            "v2",
            "https://tools.example.com/app",
            vec!["/".into(), "/index.html".into(), "icons/a.png".into()],
        );
        let resolved = config.resolve_assets().unwrap();
        assert_eq!(
            resolved,
            vec![
                "https://tools.example.com/app/",
                "https://tools.example.com/app/index.html",
                "https://tools.example.com/app/icons/a.png",
            ]
        );
    }

    #[test]
    fn test_resolve_assets_drops_duplicates() {
        let config = CacheConfig::new(
            "v1",
            "https://host/",
            vec!["/a.js".into(), "a.js".into(), "/a.js#top".into()],
        );
        assert_eq!(config.resolve_assets().unwrap(), vec!["https://host/a.js"]);
    }

    #[test]
    fn test_invalid_base_url() {
        let config = CacheConfig::new("v1", "not a url", vec!["/".into()]);
        assert!(matches!(config.resolve_assets(), Err(CacheError::InvalidUrl(_))));
    }
}
