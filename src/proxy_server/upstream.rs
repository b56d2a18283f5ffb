//! The upstream exchange behind `/scrape`.

use bytes::Bytes;
use log::{debug, warn};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use super::types::{ProxyState, ScrapeQuery};
use crate::error_handling::{categorize_reqwest_error, describe_error, FailureKind};
use crate::initialization::init_upstream_client;

/// A fully read upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Why the upstream exchange produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl UpstreamFailure {
    /// A failure before any request was sent.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        UpstreamFailure {
            kind: FailureKind::InvalidUrl,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for UpstreamFailure {
    fn from(e: reqwest::Error) -> Self {
        UpstreamFailure {
            kind: categorize_reqwest_error(&e),
            // The target URL may carry credentials of its own
            message: describe_error(&e.without_url()),
        }
    }
}

/// `http://<group>:<api key>@<host>`, credentials percent-encoded.
pub fn forward_proxy_url(group: &str, api_key: &str, host: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("http://{}", host))?;
    // Cannot fail for an http URL with a host
    let _ = url.set_username(group);
    let _ = url.set_password(Some(api_key));
    Ok(url)
}

/// Requests `targetUrl`, through the forward proxy when an API key is given.
pub async fn fetch_upstream(
    state: &ProxyState,
    query: &ScrapeQuery,
) -> Result<UpstreamResponse, UpstreamFailure> {
    let target = query
        .target_url
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| UpstreamFailure::invalid_url("Invalid URL: targetUrl is required"))?;
    let target =
        Url::parse(target).map_err(|e| UpstreamFailure::invalid_url(format!("Invalid URL: {}", e)))?;

    let client = match query.api_key() {
        Some(api_key) => {
            let proxy = forward_proxy_url(query.advanced(), api_key, &state.config.upstream_proxy_host)
                .map_err(|e| UpstreamFailure::invalid_url(format!("Invalid proxy URL: {}", e)))?;
            debug!(
                "Forwarding {} via {} (group {})",
                target, state.config.upstream_proxy_host, query.advanced()
            );
            init_upstream_client(
                &state.config.user_agent,
                state.config.timeout_seconds,
                Some(proxy.as_str()),
            )?
        }
        None => {
            debug!("Forwarding {} directly", target);
            state.direct_client.clone()
        }
    };

    let result = async {
        let response = client.get(target.clone()).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
    .await;

    result.map_err(|e| {
        let failure = UpstreamFailure::from(e);
        warn!("Upstream request to {} failed ({}): {}", target, failure.kind.code(), failure.message);
        failure
    })
}
