//! Filesystem-backed bucket store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<hex(bucket name)>/bucket.json        { name, created_at }
//! <root>/<hex(bucket name)>/<sha256(key)>.json  serialized CacheEntry
//! ```
//!
//! Deletion first renames the bucket directory to a tombstone
//! (`<hex>.deleting-<pid>-<n>`), so a torn delete never leaves a bucket that
//! looks live. Tombstones are purged on the next listing. A hex-named
//! directory whose metadata is gone is still listed under its decoded name so
//! activation can reclaim it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use super::CacheStorage;
use crate::error::CacheError;
use crate::models::{CacheEntry, StoredResponse};

/// Metadata file name inside each bucket directory
const BUCKET_META_FILE: &str = "bucket.json";

/// Marker in the name of a bucket directory being deleted
const TOMBSTONE_MARKER: &str = ".deleting-";

/// Source of unique suffixes for temp files and tombstones
static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_suffix() -> String {
    let n = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", std::process::id(), n)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BucketMeta {
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(hex::encode(bucket.as_bytes()))
    }

    fn entry_path(&self, bucket: &str, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.bucket_dir(bucket)
            .join(format!("{}.json", hex::encode(digest)))
    }

    async fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file so readers never see a partial entry
    async fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheError> {
        let contents = serde_json::to_string_pretty(value)?;
        // Unique per writer: concurrent saves of one path must not share a temp file
        let tmp = path.with_extension(format!("json.{}.tmp", unique_suffix()));
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn bucket_metas(&self) -> Result<Vec<BucketMeta>, CacheError> {
        let mut metas = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(child) = dir.next_entry().await? {
            if !child.file_type().await?.is_dir() {
                continue;
            }
            let path = child.path();
            let dir_name = child.file_name().to_string_lossy().into_owned();

            if dir_name.contains(TOMBSTONE_MARKER) {
                Self::purge_tombstone(&path).await;
                continue;
            }

            let meta_path = path.join(BUCKET_META_FILE);
            let meta = match Self::load::<BucketMeta>(&meta_path).await {
                Ok(Some(meta)) => Some(meta),
                Ok(None) => None,
                Err(e) => {
                    warn!(path = %meta_path.display(), error = %e, "Unreadable bucket metadata");
                    None
                }
            };

            match meta.or_else(|| Self::orphan_meta(&dir_name)) {
                Some(meta) => metas.push(meta),
                None => {
                    debug!(path = %path.display(), "Skipping directory that is not a bucket");
                }
            }
        }

        metas.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(metas)
    }

    /// A bucket directory that lost its metadata, listed oldest-first
    fn orphan_meta(dir_name: &str) -> Option<BucketMeta> {
        let bytes = hex::decode(dir_name).ok()?;
        let name = String::from_utf8(bytes).ok()?;
        warn!(bucket = %name, "Bucket directory without metadata");
        Some(BucketMeta {
            name,
            created_at: DateTime::<Utc>::MIN_UTC,
        })
    }

    async fn purge_tombstone(path: &Path) {
        match fs::remove_dir_all(path).await {
            Ok(()) => debug!(path = %path.display(), "Purged deleted bucket"),
            // Another deleter got there first
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to purge deleted bucket"),
        }
    }

    async fn require_bucket(&self, bucket: &str) -> Result<PathBuf, CacheError> {
        let dir = self.bucket_dir(bucket);
        if fs::try_exists(dir.join(BUCKET_META_FILE)).await? {
            Ok(dir)
        } else {
            Err(CacheError::BucketNotFound(bucket.to_string()))
        }
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        let dir = self.bucket_dir(bucket);
        let meta_path = dir.join(BUCKET_META_FILE);
        if fs::try_exists(&meta_path).await? {
            return Ok(());
        }

        debug!(bucket = bucket, path = %dir.display(), "Creating cache bucket");
        fs::create_dir_all(&dir).await?;
        let meta = BucketMeta {
            name: bucket.to_string(),
            created_at: Utc::now(),
        };
        Self::save(&meta_path, &meta).await
    }

    async fn has(&self, bucket: &str) -> Result<bool, CacheError> {
        Ok(fs::try_exists(self.bucket_dir(bucket).join(BUCKET_META_FILE)).await?)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        let dir = self.bucket_dir(bucket);
        let tombstone = self.root.join(format!(
            "{}{}{}",
            hex::encode(bucket.as_bytes()),
            TOMBSTONE_MARKER,
            unique_suffix()
        ));

        match fs::rename(&dir, &tombstone).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        debug!(bucket = bucket, "Bucket moved to tombstone");
        match fs::remove_dir_all(&tombstone).await {
            // A concurrent listing purged the tombstone already
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(true),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .bucket_metas()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), CacheError> {
        self.require_bucket(bucket).await?;
        let entry = CacheEntry::new(key, response);
        Self::save(&self.entry_path(bucket, key), &entry).await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(bucket, key);
        match Self::load(&path).await {
            Err(CacheError::Serialization(e)) => {
                warn!(bucket = bucket, key = key, path = %path.display(), error = %e, "Corrupt cache entry, treating as miss");
                Ok(None)
            }
            other => other,
        }
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<CacheEntry>, CacheError> {
        let dir = self.require_bucket(bucket).await?;
        let mut entries = Vec::new();
        let mut listing = fs::read_dir(&dir).await?;

        while let Some(child) = listing.next_entry().await? {
            let path = child.path();
            let is_entry = path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != BUCKET_META_FILE);
            if !is_entry {
                continue;
            }
            match Self::load::<CacheEntry>(&path).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(CacheError::Serialization(e)) => {
                    warn!(path = %path.display(), error = %e, "Skipping corrupt cache entry");
                }
                Err(e) => return Err(e),
            }
        }

        entries.sort_by(|a, b| a.request_url.cmp(&b.request_url));
        Ok(entries)
    }
}
