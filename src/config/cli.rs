//! Command-line interface.
//!
//! Parsed with clap and converted into the library's `CompareConfig` /
//! `ProxyConfig`; the library types never depend on the CLI.

use std::collections::BTreeMap;

use clap::{Args, Parser, Subcommand};

use super::constants::{
    DEFAULT_APIFY_ENDPOINT, DEFAULT_PROXY_HOST, DEFAULT_PROXY_PORT, DEFAULT_TARGET_URL,
    DEFAULT_UPSTREAM_PROXY_HOST, DEFAULT_USER_AGENT, REQUEST_TIMEOUT_SECS, SERVICE_FETCH,
    UPSTREAM_TIMEOUT,
};
use super::types::{CompareConfig, LogFormat, LogLevel, ProxyConfig, ReportFormat, SettingsByService};
use crate::error_handling::ConfigError;
use crate::services::{Credentials, ServiceRegistry, SettingValue};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Direct fetch only
/// scraping_services_tester compare https://api.github.com/users/strajk
///
/// # Two vendors, one token from the CLI, one from SCRAPINGBEE_TOKEN
/// scraping_services_tester compare https://www.bike24.com/p2160000.html \
///     --service zenrows,scrapingbee --token zenrows=abc123 \
///     --setting scrapingbee.premium_proxy=true
///
/// # Forwarding server on PORT (default 8080)
/// scraping_services_tester proxy
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "scraping_services_tester",
    version,
    about = "Compares scraping services side by side and runs a forwarding proxy for Apify."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a URL through the selected services and compare the results
    Compare(CompareArgs),
    /// Run the `/scrape` forwarding server
    Proxy(ProxyArgs),
}

/// `--token service=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenArg {
    /// Service id
    pub service: String,
    /// API token
    pub token: String,
}

/// `--setting service.key=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingArg {
    /// Service id
    pub service: String,
    /// Setting key
    pub key: String,
    /// Raw value, checked against the setting's kind later
    pub value: String,
}

/// Parses `service=token`.
pub fn parse_token_arg(raw: &str) -> Result<TokenArg, ConfigError> {
    let (service, token) = raw
        .split_once('=')
        .filter(|(service, _)| !service.trim().is_empty())
        .ok_or_else(|| ConfigError::InvalidTokenArgument(raw.to_string()))?;
    Ok(TokenArg {
        service: service.trim().to_string(),
        token: token.trim().to_string(),
    })
}

/// Parses `service.key=value`.
pub fn parse_setting_arg(raw: &str) -> Result<SettingArg, ConfigError> {
    let invalid = || ConfigError::InvalidSettingArgument(raw.to_string());
    let (path, value) = raw.split_once('=').ok_or_else(invalid)?;
    let (service, key) = path.split_once('.').ok_or_else(invalid)?;
    if service.trim().is_empty() || key.trim().is_empty() {
        return Err(invalid());
    }
    Ok(SettingArg {
        service: service.trim().to_string(),
        key: key.trim().to_string(),
        value: value.trim().to_string(),
    })
}

/// Options of `compare`.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Target URL
    #[arg(default_value = DEFAULT_TARGET_URL)]
    pub url: String,

    /// Service to query (repeatable or comma-separated); defaults to `fetch`
    #[arg(short, long = "service", value_delimiter = ',', conflicts_with = "all")]
    pub services: Vec<String>,

    /// Query every registered service
    #[arg(long)]
    pub all: bool,

    /// API token as `service=value` (repeatable); overrides `<SERVICE>_TOKEN`
    #[arg(long = "token", value_parser = parse_token_arg)]
    pub tokens: Vec<TokenArg>,

    /// Setting override as `service.key=value` (repeatable)
    #[arg(long = "setting", value_parser = parse_setting_arg)]
    pub settings: Vec<SettingArg>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// User-Agent for the direct `fetch` service
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// `/scrape` endpoint used by the `apify` service
    #[arg(long, env = "APIFY_ENDPOINT", default_value = DEFAULT_APIFY_ENDPOINT)]
    pub apify_endpoint: String,

    /// Report format: table|json
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    /// Print the registered services and their settings, then exit
    #[arg(long)]
    pub list_services: bool,

    /// Print example target URLs, then exit
    #[arg(long)]
    pub list_examples: bool,
}

impl CompareArgs {
    /// Converts into a `CompareConfig`, reading tokens from the environment.
    pub fn into_config(self) -> Result<CompareConfig, ConfigError> {
        self.into_config_with(|var| std::env::var(var).ok())
    }

    /// Like `into_config`, with `lookup` standing in for the environment.
    ///
    /// Services named by `--token` or `--setting` must be registered.
    pub fn into_config_with<F>(self, lookup: F) -> Result<CompareConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry = ServiceRegistry::builtin();
        let known = |service: &str| {
            if registry.contains(service) {
                Ok(())
            } else {
                Err(ConfigError::UnknownService(service.to_string()))
            }
        };

        let services = if self.all {
            registry.ids().into_iter().map(str::to_string).collect()
        } else if self.services.is_empty() {
            vec![SERVICE_FETCH.to_string()]
        } else {
            self.services
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let mut from_cli = Credentials::new();
        for TokenArg { service, token } in self.tokens {
            known(&service)?;
            from_cli.insert(service, token);
        }
        let credentials = Credentials::from_lookup(registry.ids(), lookup).merge(from_cli);
        let tokens: BTreeMap<String, String> = credentials
            .services()
            .filter_map(|s| credentials.get(s).map(|t| (s.to_string(), t.to_string())))
            .collect();

        let mut settings = SettingsByService::new();
        for SettingArg {
            service,
            key,
            value,
        } in self.settings
        {
            known(&service)?;
            settings
                .entry(service)
                .or_default()
                .insert(key, SettingValue::Text(value));
        }

        Ok(CompareConfig {
            target_url: self.url,
            services,
            tokens,
            settings,
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent,
            apify_endpoint: self.apify_endpoint,
            report_format: self.format,
        })
    }
}

/// Options of `proxy`.
#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PROXY_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_PROXY_HOST)]
    pub host: String,

    /// Forward proxy `host:port` used when an `apiKey` is supplied
    #[arg(long, env = "UPSTREAM_PROXY_HOST", default_value = DEFAULT_UPSTREAM_PROXY_HOST)]
    pub upstream_proxy_host: String,

    /// Answer upstream failures with status 200 instead of 500
    #[arg(long)]
    pub legacy_error_status: bool,

    /// User-Agent sent upstream
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = UPSTREAM_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,
}

impl From<ProxyArgs> for ProxyConfig {
    fn from(args: ProxyArgs) -> Self {
        ProxyConfig {
            host: args.host,
            port: args.port,
            upstream_proxy_host: args.upstream_proxy_host,
            legacy_error_status: args.legacy_error_status,
            user_agent: args.user_agent,
            timeout_seconds: args.timeout_seconds,
        }
    }
}
