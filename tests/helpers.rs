// Shared test helpers for building dispatchers against mock servers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::Arc;

use scraping_services_tester::initialization::init_client;
use scraping_services_tester::services::{
    CredentialRule, QueryApi, RequestTemplate, ServiceDefinition, ServiceRegistry, SettingDef,
};
use scraping_services_tester::{Dispatcher, SharedResultStore};

/// A credentialed query-parameter vendor whose endpoint is `base_url`.
#[allow(dead_code)] // Used by other test files
pub fn vendor_service(id: &'static str, base_url: &str) -> ServiceDefinition {
    ServiceDefinition {
        id,
        name: "Mock Vendor",
        link: None,
        dashboard_link: None,
        credential: CredentialRule::Required,
        token_format: None,
        template: RequestTemplate::QueryApi(QueryApi {
            base_url: base_url.to_string(),
            url_param: "url",
            auth_param: "api_key",
            fixed_params: vec![("dynamic", "false")],
            remaps: Vec::new(),
        }),
        settings: vec![
            SettingDef::boolean("premium", "Premium proxy", "", false),
            SettingDef::select("country", "Country", "", "us", &["us", "de"]),
        ],
    }
}

/// The built-in `fetch` service plus `extra`.
#[allow(dead_code)] // Used by other test files
pub fn registry_with(extra: Vec<ServiceDefinition>) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    if let Some(fetch) = ServiceRegistry::builtin().get("fetch") {
        registry.register(fetch.clone());
    }
    for service in extra {
        registry.register(service);
    }
    registry
}

/// A dispatcher with a fresh store and a short request timeout.
#[allow(dead_code)] // Used by other test files
pub fn dispatcher(registry: ServiceRegistry, timeout_seconds: u64) -> Dispatcher {
    let client: Arc<reqwest::Client> =
        init_client("scraping-services-tester-tests", timeout_seconds).expect("Failed to create client");
    Dispatcher::new(client, registry, SharedResultStore::new())
}
