//! The offline cache lifecycle.
//!
//! `OfflineCacheManager` reacts to three externally-triggered events:
//! - install: seed the current generation's bucket, then skip waiting
//! - fetch: answer from any bucket, else go to the network
//! - activate: delete stale generations, then claim clients

pub mod clients;
pub mod manager;
pub mod observer;
pub mod state;

pub use clients::{ClientControl, ClientRegistry};
pub use manager::{ActivateReport, InstallReport, OfflineCacheManager, ResponseSource, SkippedAsset};
pub use observer::{SeedObserver, SilentObserver, TracingObserver};
pub use state::LifecycleState;
