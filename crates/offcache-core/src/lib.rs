//! offcache core library.
//!
//! Implements a versioned offline cache lifecycle: a cache generation is
//! seeded with a fixed asset list on install, serves cache-first responses on
//! fetch, and stale generations are garbage-collected on activate.
//!
//! The pieces:
//! - `config`: version token and asset list for one deployment
//! - `models`: request, response and entry snapshots
//! - `storage`: named cache buckets (in memory or on disk)
//! - `net`: the network seam and its reqwest implementation
//! - `worker`: the `OfflineCacheManager` lifecycle itself

pub mod config;
pub mod error;
pub mod models;
pub mod net;
pub mod storage;
pub mod worker;

pub use config::{default_store_dir, CacheConfig, DEFAULT_ASSETS, DEFAULT_BASE_URL, DEFAULT_VERSION};
pub use error::{CacheError, NetworkError};
pub use models::{CacheEntry, CacheRequest, StoredResponse};
pub use net::{HttpNetwork, Network};
pub use storage::{CacheStorage, DiskStorage, MemoryStorage};
pub use worker::{
    ActivateReport, ClientControl, ClientRegistry, InstallReport, LifecycleState,
    OfflineCacheManager, ResponseSource, SeedObserver, SilentObserver, SkippedAsset,
    TracingObserver,
};
