//! One-route HTTP forwarding server.
//!
//! `GET /scrape?targetUrl=..&apiKey=..&advanced=..&mode=..` requests the
//! target, through a credentialed forward proxy when an API key is given, and
//! either relays the upstream response (`mode=pass-through`, the default) or
//! describes it as JSON. Every other path is a plain-text 404. All responses
//! carry `Access-Control-Allow-Origin: *`.

mod handlers;
mod types;
mod upstream;

use axum::http::{HeaderName, HeaderValue};
use axum::middleware;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::{ProxyConfig, HEADER_ACCESS_CONTROL_ALLOW_ORIGIN};
use handlers::{not_found_handler, scrape_handler};
pub use types::{ProxyState, ScrapeQuery, UpstreamEnvelope};
pub use upstream::forward_proxy_url;

/// Builds the router for `state`.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/scrape", any(scrape_handler))
        .fallback(not_found_handler)
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

async fn allow_any_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static(HEADER_ACCESS_CONTROL_ALLOW_ORIGIN),
        HeaderValue::from_static("*"),
    );
    response
}

/// Serves on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    config: ProxyConfig,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let state = ProxyState::new(config)?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Proxy server error: {}", e))?;
    Ok(())
}

/// Binds `config.host:config.port` and serves until `shutdown` is cancelled.
pub async fn start_proxy_server(
    config: ProxyConfig,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind proxy server to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}/", addr);
    log::info!("  - Scrape: http://{}/scrape?targetUrl=<url>&apiKey=<key>", addr);
    log::info!("  - Forward proxy: {}", config.upstream_proxy_host);
    if config.legacy_error_status {
        log::info!("  - Upstream failures answered with status 200");
    }

    serve(listener, config, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_proxy_server_port_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = taken.local_addr().expect("local addr").port();
        let config = ProxyConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let err = start_proxy_server(config, CancellationToken::new())
            .await
            .expect_err("port is taken");
        assert!(err.to_string().contains("Failed to bind proxy server"));
        assert!(err.to_string().contains(&port.to_string()));
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let token = CancellationToken::new();
        token.cancel();
        serve(listener, ProxyConfig::default(), token)
            .await
            .expect("clean shutdown");
    }
}
