use std::sync::{Arc, Mutex};

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::clients::ClientControl;
use super::observer::{SeedObserver, SilentObserver};
use super::state::LifecycleState;
use crate::config::CacheConfig;
use crate::error::{CacheError, NetworkError};
use crate::models::{CacheRequest, StoredResponse};
use crate::net::Network;
use crate::storage::CacheStorage;

/// An asset that could not be fetched or stored during install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub bucket: String,
    pub seeded: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivateReport {
    pub current: String,
    pub deleted: Vec<String>,
}

/// Where a fetched response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Network,
}

/// Versioned offline cache: seeds on install, serves cache-first on fetch,
/// removes stale generations on activate.
pub struct OfflineCacheManager {
    config: CacheConfig,
    /// Asset URLs resolved against the base URL
    assets: Vec<String>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    clients: Arc<dyn ClientControl>,
    observer: Arc<dyn SeedObserver>,
    state: Mutex<LifecycleState>,
}

impl OfflineCacheManager {
    pub fn new(
        config: CacheConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn ClientControl>,
    ) -> Result<Self, CacheError> {
        config.validate()?;
        let assets = config.resolve_assets()?;

        Ok(Self {
            config,
            assets,
            storage,
            network,
            clients,
            observer: Arc::new(SilentObserver),
            state: Mutex::new(LifecycleState::Parsed),
        })
    }

    /// Replace the seed observer (silent by default)
    pub fn with_observer(mut self, observer: Arc<dyn SeedObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(version = %self.config.version, from = %*state, to = %next, "Lifecycle transition");
        *state = next;
    }

    // ===== Install =====

    /// Open the current generation's bucket and seed every asset concurrently.
    ///
    /// A failing asset is skipped and reported; it never fails the install.
    /// Once all assets settle the generation skips waiting.
    pub async fn install(&self) -> Result<InstallReport, CacheError> {
        let bucket = self.config.version.as_str();
        self.set_state(LifecycleState::Installing);
        info!(version = bucket, assets = self.assets.len(), "Installing cache generation");

        if let Err(e) = self.storage.open(bucket).await {
            self.set_state(LifecycleState::Redundant);
            return Err(e);
        }

        let outcomes = join_all(self.assets.iter().map(|url| self.seed_one(bucket, url))).await;

        let mut report = InstallReport {
            bucket: bucket.to_string(),
            ..Default::default()
        };
        for (url, outcome) in self.assets.iter().zip(outcomes) {
            match outcome {
                Ok(()) => {
                    self.observer.on_seeded(bucket, url);
                    report.seeded.push(url.clone());
                }
                Err(e) => {
                    self.observer.on_skipped(bucket, url, &e);
                    report.skipped.push(SkippedAsset {
                        url: url.clone(),
                        error: e.summary(),
                    });
                }
            }
        }

        self.clients.skip_waiting(bucket);
        self.set_state(LifecycleState::Installed);
        info!(
            version = bucket,
            seeded = report.seeded.len(),
            skipped = report.skipped.len(),
            "Cache generation installed"
        );
        Ok(report)
    }

    async fn seed_one(&self, bucket: &str, url: &str) -> Result<(), CacheError> {
        let response = self.network.fetch(&CacheRequest::get(url)).await?;
        if !response.is_ok() {
            return Err(NetworkError::InvalidResponse(format!(
                "status {} for {}",
                response.status, url
            ))
            .into());
        }
        self.storage.put(bucket, url, response).await
    }

    // ===== Fetch =====

    /// Cache-first fetch. A hit in any bucket is returned verbatim; a miss
    /// goes to the network and the response is not stored.
    pub async fn fetch(&self, request: &CacheRequest) -> Result<StoredResponse, CacheError> {
        self.fetch_with_source(request)
            .await
            .map(|(response, _)| response)
    }

    pub async fn fetch_with_source(
        &self,
        request: &CacheRequest,
    ) -> Result<(StoredResponse, ResponseSource), CacheError> {
        if request.is_cacheable() {
            let key = request.cache_key()?;
            if let Some(entry) = self.storage.match_any(&key).await? {
                debug!(url = %key, "Cache hit");
                return Ok((entry.response, ResponseSource::Cache));
            }
            debug!(url = %key, "Cache miss");
        }

        let response = self.network.fetch(request).await?;
        Ok((response, ResponseSource::Network))
    }

    // ===== Activate =====

    /// Delete every bucket not named by the current version, then claim all
    /// open clients. Deletions run concurrently; the first failure is
    /// returned after all of them settle and clients are not claimed.
    pub async fn activate(&self) -> Result<ActivateReport, CacheError> {
        let current = self.config.version.as_str();
        self.set_state(LifecycleState::Activating);

        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        let outcomes = join_all(stale.iter().map(|name| self.storage.delete(name))).await;

        let mut report = ActivateReport {
            current: current.to_string(),
            deleted: Vec::new(),
        };
        let mut first_error = None;
        for (name, outcome) in stale.into_iter().zip(outcomes) {
            match outcome {
                Ok(true) => {
                    debug!(bucket = %name, "Deleted stale cache generation");
                    report.deleted.push(name);
                }
                // Already gone: another activation got there first
                Ok(false) => {}
                Err(e) => {
                    warn!(bucket = %name, error = %e, "Failed to delete stale cache generation");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        self.clients.claim(current);
        self.set_state(LifecycleState::Activated);
        info!(version = current, deleted = report.deleted.len(), "Cache generation activated");
        Ok(report)
    }
}
