//! Request and response snapshots stored in cache buckets.
//!
//! - `CacheRequest`: an outgoing request as seen by the fetch path
//! - `StoredResponse`: a full HTTP response snapshot (status, headers, body)
//! - `CacheEntry`: a stored response plus the time it was cached

pub mod entry;
pub mod request;

pub use entry::{CacheEntry, StoredResponse};
pub use request::{normalize_key, CacheRequest};
