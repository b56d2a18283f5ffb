//! Proxy server data structures.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ProxyConfig, DEFAULT_PROXY_GROUP, MODE_PASS_THROUGH};
use crate::error_handling::InitializationError;
use crate::initialization::init_upstream_client;
use crate::results::ResponseHeaders;

/// Shared state for the proxy server
#[derive(Clone)]
pub struct ProxyState {
    /// Server configuration
    pub config: Arc<ProxyConfig>,
    /// Client for requests without an API key (no forward proxy)
    pub direct_client: reqwest::Client,
}

impl ProxyState {
    /// Builds the state, including the reusable direct client.
    pub fn new(config: ProxyConfig) -> Result<Self, InitializationError> {
        let direct_client = init_upstream_client(&config.user_agent, config.timeout_seconds, None)?;
        Ok(ProxyState {
            config: Arc::new(config),
            direct_client,
        })
    }
}

/// Query parameters of `/scrape`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeQuery {
    /// URL to request
    pub target_url: Option<String>,
    /// Forward proxy password; no proxy when absent or empty
    pub api_key: Option<String>,
    /// Proxy group selector, used as the forward proxy username
    pub advanced: Option<String>,
    /// `pass-through` or anything else for the JSON envelope
    pub mode: Option<String>,
}

impl ScrapeQuery {
    /// Proxy group, defaulting to `groups-RESIDENTIAL`.
    pub fn advanced(&self) -> &str {
        self.advanced.as_deref().unwrap_or(DEFAULT_PROXY_GROUP)
    }

    /// API key, when present and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// True unless a mode other than `pass-through` was asked for.
    pub fn is_pass_through(&self) -> bool {
        self.mode.as_deref().unwrap_or(MODE_PASS_THROUGH) == MODE_PASS_THROUGH
    }
}

/// JSON body of non-pass-through and failure responses
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamEnvelope {
    /// Upstream headers (empty on failure)
    pub headers: ResponseHeaders,
    /// Upstream status (500 on failure)
    pub status_code: u16,
    /// Reason phrase, or the failure code
    pub status_message: String,
    /// Upstream body as text, or the failure message
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_query_defaults() {
        let query = ScrapeQuery::default();
        assert_eq!(query.advanced(), "groups-RESIDENTIAL");
        assert!(query.is_pass_through());
        assert_eq!(query.api_key(), None);
    }

    #[test]
    fn test_scrape_query_overrides() {
        let query = ScrapeQuery {
            target_url: Some("https://example.com".to_string()),
            api_key: Some(String::new()),
            advanced: Some("groups-SHADER".to_string()),
            mode: Some("json".to_string()),
        };
        assert_eq!(query.advanced(), "groups-SHADER");
        assert!(!query.is_pass_through());
        // An empty key means a direct request
        assert_eq!(query.api_key(), None);
    }

    #[test]
    fn test_envelope_field_names() {
        let envelope = UpstreamEnvelope {
            headers: ResponseHeaders::new(),
            status_code: 500,
            status_message: "ETIMEDOUT".to_string(),
            body: "operation timed out".to_string(),
        };
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "headers": {},
                "statusCode": 500,
                "statusMessage": "ETIMEDOUT",
                "body": "operation timed out"
            })
        );
    }
}
