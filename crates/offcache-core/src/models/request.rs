use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl CacheRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_method(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Only GET requests are answered from cache buckets
    pub fn is_cacheable(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Lookup key for this request
    pub fn cache_key(&self) -> Result<String, CacheError> {
        normalize_key(&self.url)
    }
}

/// Normalize a request URL into a bucket key.
/// Fragments never reach the server, so they are not part of the key.
pub fn normalize_key(url: &str) -> Result<String, CacheError> {
    let mut parsed =
        Url::parse(url.trim()).map_err(|e| CacheError::InvalidUrl(format!("{}: {}", url, e)))?;
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}
