//! Configuration types.
//!
//! This module defines the enums and structs used by the CLI and by library
//! callers. None of the library structs depend on `clap`; the CLI converts into
//! them (see `config::cli`).

use std::collections::BTreeMap;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_APIFY_ENDPOINT, DEFAULT_PROXY_HOST, DEFAULT_PROXY_PORT, DEFAULT_TARGET_URL,
    DEFAULT_UPSTREAM_PROXY_HOST, DEFAULT_USER_AGENT, REQUEST_TIMEOUT_SECS, SERVICE_FETCH,
};
use crate::services::SettingValue;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How the `compare` command prints its results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One table per service (default)
    Table,
    /// Every attempt as a JSON array on stdout
    Json,
}

/// Per-service setting overrides, keyed by service id then setting key.
pub type SettingsByService = BTreeMap<String, BTreeMap<String, SettingValue>>;

/// Configuration of one comparison run.
///
/// # Examples
///
/// ```no_run
/// use scraping_services_tester::CompareConfig;
///
/// let config = CompareConfig {
///     target_url: "https://example.com".to_string(),
///     services: vec!["fetch".to_string(), "scrapingbee".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// URL every selected service is asked to fetch
    pub target_url: String,

    /// Selected service ids, in the order results should be reported
    pub services: Vec<String>,

    /// API tokens keyed by service id
    pub tokens: BTreeMap<String, String>,

    /// Setting overrides keyed by service id
    pub settings: SettingsByService,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// `/scrape` endpoint the `apify` service talks to
    pub apify_endpoint: String,

    /// Output format of the final report
    pub report_format: ReportFormat,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            services: vec![SERVICE_FETCH.to_string()],
            tokens: BTreeMap::new(),
            settings: BTreeMap::new(),
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            apify_endpoint: DEFAULT_APIFY_ENDPOINT.to_string(),
            report_format: ReportFormat::Table,
        }
    }
}

/// Configuration of the `/scrape` forwarding server.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// `host:port` of the credentialed forward proxy
    pub upstream_proxy_host: String,

    /// Answer upstream failures with status 200 (the body still says 500)
    pub legacy_error_status: bool,

    /// User-Agent sent upstream
    pub user_agent: String,

    /// Upstream request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PROXY_HOST.to_string(),
            port: DEFAULT_PROXY_PORT,
            upstream_proxy_host: DEFAULT_UPSTREAM_PROXY_HOST.to_string(),
            legacy_error_status: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: crate::config::constants::UPSTREAM_TIMEOUT.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_compare_config_default() {
        let config = CompareConfig::default();
        assert_eq!(config.services, vec!["fetch".to_string()]);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.report_format, ReportFormat::Table);
        assert!(config.tokens.is_empty());
        assert_eq!(config.apify_endpoint, "https://apify-proxy-aas.fly.dev/scrape");
    }

    #[test]
    fn test_proxy_config_default() {
        let config = ProxyConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_proxy_host, "proxy.apify.com:8000");
        assert!(!config.legacy_error_status);
    }
}
