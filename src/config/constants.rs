//! Configuration constants.
//!
//! This module defines the defaults used throughout the application: timeouts,
//! proxy server defaults, service identifiers and the example targets.

use std::time::Duration;

// Network operation timeouts
/// Per-request timeout in seconds for dispatched service requests.
///
/// Scraping APIs that render or retry on their side routinely take 10-20s,
/// so the default leaves headroom above that.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Upper bound used by the proxy server for a single upstream exchange
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Default User-Agent string for HTTP requests.
///
/// Only the direct `fetch` service and the proxy server's upstream requests are
/// sent with it; vendor APIs pick their own browser fingerprints.
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Proxy server
/// Default listening port (overridable with `PORT`)
pub const DEFAULT_PROXY_PORT: u16 = 8080;
/// Default bind address of the proxy server
pub const DEFAULT_PROXY_HOST: &str = "0.0.0.0";
/// Forward proxy the `/scrape` route routes through when an API key is supplied
pub const DEFAULT_UPSTREAM_PROXY_HOST: &str = "proxy.apify.com:8000";
/// Default value of the `advanced` query parameter (Apify proxy group selector)
pub const DEFAULT_PROXY_GROUP: &str = "groups-RESIDENTIAL";
/// Default value of the `mode` query parameter
pub const MODE_PASS_THROUGH: &str = "pass-through";
/// Public deployment of the proxy server used by the `apify` service
pub const DEFAULT_APIFY_ENDPOINT: &str = "https://apify-proxy-aas.fly.dev/scrape";

// Service identifiers
/// Identifier of the credential-less direct fetch service
pub const SERVICE_FETCH: &str = "fetch";
/// Identifier of Apify proxy via the `/scrape` forwarding server
pub const SERVICE_APIFY: &str = "apify";
/// Identifier of ScrapingBee
pub const SERVICE_SCRAPINGBEE: &str = "scrapingbee";
/// Identifier of ScrapingDog
pub const SERVICE_SCRAPINGDOG: &str = "scrapingdog";
/// Identifier of ScrapingOwl
pub const SERVICE_SCRAPINGOWL: &str = "scrapingowl";
/// Identifier of ScraperAPI
pub const SERVICE_SCRAPERAPI: &str = "scraperapi";
/// Identifier of ZenRows
pub const SERVICE_ZENROWS: &str = "zenrows";

/// Suffix of the environment variable holding a service token (`SCRAPINGBEE_TOKEN`)
pub const TOKEN_ENV_SUFFIX: &str = "_TOKEN";

/// Default target when none is given.
pub const DEFAULT_TARGET_URL: &str = "https://api.github.com/users/strajk";

/// Example targets with the protection they sit behind.
pub const EXAMPLE_TARGETS: &[(&str, &str)] = &[
    ("GitHub profile (no protection)", "https://api.github.com/users/strajk"),
    (
        "StarWars API (no protection)",
        "https://swapi.dev/api/people/1/?format=json",
    ),
    (
        "StockX API (PerimeterX)",
        "https://stockx.com/api/products/a84b0299-c372-4828-b926-5579c076bdc6/activity?limit=10&page=1&sort=createdAt&order=DESC&state=480&currency=EUR&country=US",
    ),
    ("Bike24 product (Cloudflare)", "https://www.bike24.com/p2160000.html"),
];

/// Capacity of the result store's change-event channel.
///
/// Slow subscribers lag rather than block the dispatcher.
pub const STORE_EVENT_CAPACITY: usize = 256;
