//! Page-controller takeover.
//!
//! A new generation takes over twice: it skips the waiting phase once
//! seeding settles, and claims every open client once stale generations are
//! gone. `ClientControl` is the surface the manager calls for both.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

pub trait ClientControl: Send + Sync {
    /// Mark `version` ready to take over without waiting for sessions to close
    fn skip_waiting(&self, version: &str);

    /// Make `version` the controller of every open client session
    fn claim(&self, version: &str);
}

#[derive(Debug, Default)]
struct RegistryState {
    /// client id -> controlling version, if any
    clients: BTreeMap<String, Option<String>>,
    /// version that skipped waiting most recently
    ready: Option<String>,
}

/// In-process record of open client sessions and who controls them.
/// Clone is cheap and shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A poisoned registry still holds consistent data: every write is a single insert
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an open session. New sessions start uncontrolled.
    pub fn connect(&self, client_id: impl Into<String>) {
        self.lock().clients.entry(client_id.into()).or_insert(None);
    }

    pub fn disconnect(&self, client_id: &str) {
        self.lock().clients.remove(client_id);
    }

    pub fn controller_of(&self, client_id: &str) -> Option<String> {
        self.lock().clients.get(client_id).cloned().flatten()
    }

    pub fn ready_version(&self) -> Option<String> {
        self.lock().ready.clone()
    }

    pub fn client_count(&self) -> usize {
        self.lock().clients.len()
    }
}

impl ClientControl for ClientRegistry {
    fn skip_waiting(&self, version: &str) {
        info!(version = version, "Generation ready to take over");
        self.lock().ready = Some(version.to_string());
    }

    fn claim(&self, version: &str) {
        let mut state = self.lock();
        for controller in state.clients.values_mut() {
            *controller = Some(version.to_string());
        }
        info!(version = version, clients = state.clients.len(), "Claimed open clients");
    }
}
