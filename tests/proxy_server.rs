//! The forwarding server, bound to a random local port, against an
//! `httptest` upstream.

use httptest::{all_of, matchers::*, responders::*, Expectation, Server};
use scraping_services_tester::proxy_server::serve;
use scraping_services_tester::ProxyConfig;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

struct RunningProxy {
    base: String,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl RunningProxy {
    async fn start(config: ProxyConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, config, shutdown.clone()));
        RunningProxy {
            base: format!("http://{}", addr),
            shutdown,
            handle,
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.handle
            .await
            .expect("server task")
            .expect("server exits cleanly");
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

async fn envelope(response: reqwest::Response) -> Value {
    let text = response.text().await.expect("body");
    serde_json::from_str(&text).expect("json envelope")
}

fn config() -> ProxyConfig {
    ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        timeout_seconds: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pass_through_relays_upstream_response() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/page")).respond_with(
            status_code(201)
                .insert_header("x-upstream", "yes")
                .insert_header("content-type", "text/html")
                .body("<html>hello</html>"),
        ),
    );

    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .query(&[("targetUrl", upstream.url_str("/page"))])
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 201);
    let headers = response.headers().clone();
    assert_eq!(headers.get("x-upstream").and_then(|v| v.to_str().ok()), Some("yes"));
    assert_eq!(headers.get("content-type").and_then(|v| v.to_str().ok()), Some("text/html"));
    assert_eq!(
        headers.get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(response.text().await.expect("body"), "<html>hello</html>");

    proxy.stop().await;
}

#[tokio::test]
async fn test_json_mode_describes_upstream_response() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/api")).respond_with(
            status_code(404)
                .insert_header("x-upstream", "yes")
                .body("missing"),
        ),
    );

    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .query(&[("targetUrl", upstream.url_str("/api")), ("mode", "json".to_string())])
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 200);
    let envelope = envelope(response).await;
    assert_eq!(envelope["statusCode"], 404);
    assert_eq!(envelope["statusMessage"], "Not Found");
    assert_eq!(envelope["body"], "missing");
    assert_eq!(envelope["headers"]["x-upstream"], "yes");

    proxy.stop().await;
}

#[tokio::test]
async fn test_other_paths_are_not_found() {
    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!("{}/other", proxy.base))
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 404);
    let headers = response.headers().clone();
    assert!(headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/plain")));
    assert_eq!(
        headers.get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(response.text().await.expect("body"), "Not found");

    proxy.stop().await;
}

#[tokio::test]
async fn test_unreachable_target_is_a_500_envelope() {
    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .query(&[("targetUrl", "http://127.0.0.1:1/")])
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let envelope = envelope(response).await;
    assert_eq!(envelope["statusCode"], 500);
    assert_eq!(envelope["statusMessage"], "ECONNREFUSED");
    assert!(envelope["body"].as_str().is_some_and(|b| !b.is_empty()));
    assert_eq!(envelope["headers"], serde_json::json!({}));

    proxy.stop().await;
}

#[tokio::test]
async fn test_legacy_error_status_answers_200() {
    let proxy = RunningProxy::start(ProxyConfig {
        legacy_error_status: true,
        ..config()
    })
    .await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .query(&[("targetUrl", "http://127.0.0.1:1/")])
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 200);
    let envelope = envelope(response).await;
    assert_eq!(envelope["statusCode"], 500);
    assert_eq!(envelope["statusMessage"], "ECONNREFUSED");

    proxy.stop().await;
}

#[tokio::test]
async fn test_missing_target_url() {
    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 500);
    let envelope = envelope(response).await;
    assert_eq!(envelope["statusMessage"], "ERR_INVALID_URL");
    assert_eq!(envelope["body"], "Invalid URL: targetUrl is required");

    proxy.stop().await;
}

#[tokio::test]
async fn test_unreadable_query_is_an_invalid_url_envelope() {
    let proxy = RunningProxy::start(config()).await;
    let response = client()
        .get(format!(
            "{}/scrape?targetUrl=http://127.0.0.1:1/&targetUrl=http://127.0.0.1:1/",
            proxy.base
        ))
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let envelope = envelope(response).await;
    assert_eq!(envelope["statusCode"], 500);
    assert_eq!(envelope["statusMessage"], "ERR_INVALID_URL");
    assert!(envelope["body"]
        .as_str()
        .is_some_and(|b| b.starts_with("Invalid URL: ")));

    proxy.stop().await;
}

#[tokio::test]
async fn test_api_key_routes_through_forward_proxy() {
    // Stands in for the forward proxy: plain-HTTP targets are sent to it in
    // absolute form with basic credentials
    let forward_proxy = Server::run();
    forward_proxy.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/page"),
            request::headers(contains((
                "proxy-authorization",
                "Basic Z3JvdXBzLVJFU0lERU5USUFMOnNlY3JldEtleQ=="
            ))),
        ])
        .respond_with(status_code(200).body("via proxy")),
    );

    let proxy = RunningProxy::start(ProxyConfig {
        upstream_proxy_host: forward_proxy.addr().to_string(),
        ..config()
    })
    .await;
    let response = client()
        .get(format!("{}/scrape", proxy.base))
        .query(&[
            ("targetUrl", "http://upstream.invalid/page"),
            ("apiKey", "secretKey"),
        ])
        .send()
        .await
        .expect("proxy answers");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.expect("body"), "via proxy");

    proxy.stop().await;
}
