//! Network seam for the fetch path and seeding.
//!
//! `Network` performs one request and returns a full response snapshot.
//! `HttpNetwork` is the reqwest-backed implementation; tests substitute
//! their own.

pub mod client;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::{CacheRequest, StoredResponse};

pub use client::HttpNetwork;

#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Any HTTP status is a response, not an error.
    async fn fetch(&self, request: &CacheRequest) -> Result<StoredResponse, NetworkError>;
}
