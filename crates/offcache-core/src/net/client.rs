//! HTTP implementation of `Network` on top of reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use tracing::debug;

use super::Network;
use crate::error::NetworkError;
use crate::models::{CacheRequest, StoredResponse};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn build_headers(request: &CacheRequest) -> Result<header::HeaderMap, NetworkError> {
        let mut headers = header::HeaderMap::new();
        for (name, value) in &request.headers {
            let name = header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NetworkError::Transport(format!("invalid header name {}: {}", name, e)))?;
            let value = header::HeaderValue::from_str(value)
                .map_err(|e| NetworkError::Transport(format!("invalid header value: {}", e)))?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &CacheRequest) -> Result<StoredResponse, NetworkError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| NetworkError::Transport(format!("invalid method {}: {}", request.method, e)))?;

        let response = self
            .client
            .request(method, &request.url)
            .headers(Self::build_headers(request)?)
            .send()
            .await?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status = status, bytes = body.len(), "Network response");

        Ok(StoredResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_headers() {
        let request = CacheRequest::get("https://host/")
            .header("Accept", "text/html")
            .header("X-Trace", "abc");
        let headers = HttpNetwork::build_headers(&request).unwrap();
        assert_eq!(headers.get("accept").unwrap(), "text/html");
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let request = CacheRequest::get("https://host/").header("bad header", "v");
        assert!(matches!(
            HttpNetwork::build_headers(&request),
            Err(NetworkError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let network = HttpNetwork::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback: nothing listens there
        let result = network.fetch(&CacheRequest::get("http://127.0.0.1:9/")).await;
        assert!(result.is_err());
    }
}
