//! Named cache buckets.
//!
//! A bucket is a key-value store of request URL to `CacheEntry`. Buckets are
//! named by a generation's version token. `CacheStorage` is the seam the
//! manager works through; two backends are provided:
//! - `MemoryStorage`: process-local, used by tests and embedders
//! - `DiskStorage`: JSON files under a root directory, survives restarts

pub mod disk;
pub mod memory;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::models::{CacheEntry, StoredResponse};

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

/// Storage area holding named cache buckets
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it if absent
    async fn open(&self, bucket: &str) -> Result<(), CacheError>;

    async fn has(&self, bucket: &str) -> Result<bool, CacheError>;

    /// Delete a bucket and all its entries. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> Result<bool, CacheError>;

    /// Bucket names in creation order
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Store a response under `key`, replacing any previous entry
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), CacheError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// All entries of a bucket, ordered by key
    async fn entries(&self, bucket: &str) -> Result<Vec<CacheEntry>, CacheError>;

    /// Look `key` up in every bucket in creation order; first hit wins
    async fn match_any(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        for bucket in self.keys().await? {
            if let Some(entry) = self.get(&bucket, key).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}
