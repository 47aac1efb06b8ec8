use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err.to_string())
        } else if err.is_decode() || err.is_body() {
            NetworkError::InvalidResponse(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cache bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Maximum length for error detail carried into seed reports
const MAX_ERROR_DETAIL_LENGTH: usize = 200;

impl CacheError {
    /// Short, bounded description suitable for reports and log fields
    pub fn summary(&self) -> String {
        let text = self.to_string();
        if text.len() <= MAX_ERROR_DETAIL_LENGTH {
            return text;
        }
        let mut end = MAX_ERROR_DETAIL_LENGTH;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &text[..end])
    }
}
