use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::CacheStorage;
use crate::error::CacheError;
use crate::models::{CacheEntry, StoredResponse};

#[derive(Debug, Default)]
struct Bucket {
    name: String,
    entries: BTreeMap<String, CacheEntry>,
}

/// In-process bucket store. Clone is cheap and shares the buckets.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    // Vec keeps creation order
    buckets: Arc<RwLock<Vec<Bucket>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        let mut buckets = self.buckets.write().await;
        if !buckets.iter().any(|b| b.name == bucket) {
            debug!(bucket = bucket, "Creating cache bucket");
            buckets.push(Bucket {
                name: bucket.to_string(),
                entries: BTreeMap::new(),
            });
        }
        Ok(())
    }

    async fn has(&self, bucket: &str) -> Result<bool, CacheError> {
        Ok(self.buckets.read().await.iter().any(|b| b.name == bucket))
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|b| b.name != bucket);
        Ok(buckets.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .map(|b| b.name.clone())
            .collect())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), CacheError> {
        let mut buckets = self.buckets.write().await;
        let target = buckets
            .iter_mut()
            .find(|b| b.name == bucket)
            .ok_or_else(|| CacheError::BucketNotFound(bucket.to_string()))?;
        target
            .entries
            .insert(key.to_string(), CacheEntry::new(key, response));
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .find(|b| b.name == bucket)
            .and_then(|b| b.entries.get(key).cloned()))
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<CacheEntry>, CacheError> {
        let buckets = self.buckets.read().await;
        let target = buckets
            .iter()
            .find(|b| b.name == bucket)
            .ok_or_else(|| CacheError::BucketNotFound(bucket.to_string()))?;
        Ok(target.entries.values().cloned().collect())
    }
}
