//! `/scrape` handler.

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::{ProxyState, ScrapeQuery, UpstreamEnvelope};
use super::super::upstream::{fetch_upstream, UpstreamFailure, UpstreamResponse};
use crate::config::is_hop_by_hop;
use crate::results::{ResponseHeaders, StatusClass};

/// Forwards the request to `targetUrl` and relays or wraps the answer.
pub async fn scrape_handler(
    State(state): State<ProxyState>,
    query: Result<Query<ScrapeQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            let failure =
                UpstreamFailure::invalid_url(format!("Invalid URL: {}", rejection.body_text()));
            log::warn!("Rejected /scrape query: {}", failure.message);
            return failed(failure, state.config.legacy_error_status);
        }
    };

    match fetch_upstream(&state, &query).await {
        Ok(upstream) => {
            log::info!(
                "Upstream answered {} ({:?}, {} bytes)",
                upstream.status.as_u16(),
                StatusClass::from_status(upstream.status.as_u16()),
                upstream.body.len()
            );
            if query.is_pass_through() {
                pass_through(upstream)
            } else {
                wrapped(upstream)
            }
        }
        Err(failure) => failed(failure, state.config.legacy_error_status),
    }
}

/// Upstream status, headers (minus hop-by-hop) and body as-is.
fn pass_through(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    let headers = response.headers_mut();
    for (name, value) in upstream.headers.iter() {
        if !is_hop_by_hop(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    response
}

/// `200` with the upstream response described as JSON.
fn wrapped(upstream: UpstreamResponse) -> Response {
    let envelope = UpstreamEnvelope {
        headers: ResponseHeaders::from_header_map(&upstream.headers),
        status_code: upstream.status.as_u16(),
        status_message: upstream
            .status
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
        body: String::from_utf8_lossy(&upstream.body).into_owned(),
    };
    (StatusCode::OK, Json(envelope)).into_response()
}

/// The failure envelope; the status line is 500 unless `legacy_status`.
fn failed(failure: UpstreamFailure, legacy_status: bool) -> Response {
    let status = if legacy_status {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let envelope = UpstreamEnvelope {
        headers: ResponseHeaders::new(),
        status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        status_message: failure.kind.code().to_string(),
        body: failure.message,
    };
    (status, Json(envelope)).into_response()
}
