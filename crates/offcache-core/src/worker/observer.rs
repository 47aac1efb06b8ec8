use tracing::{debug, warn};

use crate::error::CacheError;

/// Receives the outcome of each asset during seeding.
///
/// Seeding never fails because of a single asset; an observer is the only
/// place a skipped asset becomes visible.
pub trait SeedObserver: Send + Sync {
    fn on_seeded(&self, _bucket: &str, _url: &str) {}

    fn on_skipped(&self, _bucket: &str, _url: &str, _error: &CacheError) {}
}

/// Ignores every outcome
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl SeedObserver for SilentObserver {}

/// Logs seeded assets at debug and skipped assets at warn
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SeedObserver for TracingObserver {
    fn on_seeded(&self, bucket: &str, url: &str) {
        debug!(bucket = bucket, url = url, "Seeded asset");
    }

    fn on_skipped(&self, bucket: &str, url: &str, error: &CacheError) {
        warn!(bucket = bucket, url = url, error = %error.summary(), "Skipped asset during seeding");
    }
}
