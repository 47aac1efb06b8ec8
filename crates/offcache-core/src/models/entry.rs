use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    /// URL the response was produced for
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(with = "base64_body")]
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            url: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Status in the 200-299 range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub request_url: String,
    pub response: StoredResponse,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(request_url: impl Into<String>, response: StoredResponse) -> Self {
        Self {
            request_url: request_url.into(),
            response,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

mod base64_body {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_ok_range() {
        assert!(StoredResponse::new(200, "").is_ok());
        assert!(StoredResponse::new(204, "").is_ok());
        assert!(!StoredResponse::new(304, "").is_ok());
        assert!(!StoredResponse::new(404, "").is_ok());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = StoredResponse::new(200, "").header("Content-Type", "text/html");
        assert_eq!(response.header_value("content-type"), Some("text/html"));
        assert_eq!(response.header_value("etag"), None);
    }

    #[test]
    fn test_body_serialized_as_base64() {
        let response = StoredResponse::new(200, vec![0u8, 159, 255]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["body"], "AJ//");

        let back: StoredResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.body, vec![0u8, 159, 255]);
    }

    #[test]
    fn test_entry_age_display() {
        let mut entry = CacheEntry::new("https://host/", StoredResponse::new(200, "ok"));
        assert_eq!(entry.age_display(), "just now");

        entry.cached_at = Utc::now() - Duration::minutes(125);
        assert_eq!(entry.age_display(), "2h ago");

        entry.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(entry.age_display(), "3d ago");
    }
}
