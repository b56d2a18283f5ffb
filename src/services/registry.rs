//! The built-in service registry.

use std::sync::LazyLock;

use super::definition::{
    CredentialRule, ParamRemap, QueryApi, RequestTemplate, ServiceDefinition, TokenFormat,
};
use super::settings::SettingDef;
use crate::config::{
    DEFAULT_APIFY_ENDPOINT, SERVICE_APIFY, SERVICE_FETCH, SERVICE_SCRAPERAPI,
    SERVICE_SCRAPINGBEE, SERVICE_SCRAPINGDOG, SERVICE_SCRAPINGOWL, SERVICE_ZENROWS,
};

const PREMIUM_NOTE: &str = "Premium proxy costs more credits";
const REQUIRES_PREMIUM: &str = "Requires premium proxy";

static BUILTIN: LazyLock<ServiceRegistry> = LazyLock::new(ServiceRegistry::with_builtin_services);

/// Ordered set of service definitions, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<ServiceDefinition>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry of built-in services.
    pub fn builtin() -> &'static ServiceRegistry {
        &BUILTIN
    }

    /// A copy of the built-in registry with the `apify` service pointed at
    /// another `/scrape` endpoint.
    pub fn builtin_with_apify_endpoint(endpoint: &str) -> ServiceRegistry {
        let mut registry = Self::builtin().clone();
        if let Some(apify) = registry.get(SERVICE_APIFY).cloned() {
            registry.register(apify.with_base_url(endpoint));
        }
        registry
    }

    /// Adds a service, replacing any with the same id in place.
    pub fn register(&mut self, service: ServiceDefinition) {
        match self.services.iter_mut().find(|s| s.id == service.id) {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
    }

    /// Looks a service up by id.
    pub fn get(&self, id: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.id == id)
    }

    /// True if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.id).collect()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.iter()
    }

    /// Number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn with_builtin_services() -> Self {
        let mut registry = Self::new();
        for service in builtin_services() {
            registry.register(service);
        }
        registry
    }
}

fn query_api(base_url: &str, auth_param: &'static str) -> QueryApi {
    QueryApi {
        base_url: base_url.to_string(),
        url_param: "url",
        auth_param,
        fixed_params: Vec::new(),
        remaps: Vec::new(),
    }
}

fn builtin_services() -> Vec<ServiceDefinition> {
    vec![
        ServiceDefinition {
            id: SERVICE_FETCH,
            name: "Native Fetch",
            link: None,
            dashboard_link: None,
            credential: CredentialRule::Optional,
            token_format: None,
            template: RequestTemplate::Direct,
            settings: Vec::new(),
        },
        ServiceDefinition {
            id: SERVICE_APIFY,
            name: "Apify",
            link: Some("https://www.apify.com"),
            dashboard_link: Some("https://console.apify.com/proxy#/usage"),
            credential: CredentialRule::Required,
            token_format: Some(TokenFormat {
                length: Some(25),
                pattern: "^[a-zA-Z]{25}$",
                hint: "25 chars long, lowercase and uppercase letters",
            }),
            template: RequestTemplate::QueryApi(QueryApi {
                base_url: DEFAULT_APIFY_ENDPOINT.to_string(),
                url_param: "targetUrl",
                auth_param: "apiKey",
                fixed_params: Vec::new(),
                remaps: vec![ParamRemap {
                    setting: "groups",
                    param: "advanced",
                    prefix: "groups-",
                }],
            }),
            settings: vec![SettingDef::text(
                "groups",
                "Groups",
                "Proxy group to use, check the Apify dashboard for the available groups.",
                "RESIDENTIAL",
            )],
        },
        ServiceDefinition {
            id: SERVICE_SCRAPINGBEE,
            name: "ScrapingBee",
            link: Some("https://www.scrapingbee.com/"),
            dashboard_link: Some("https://app.scrapingbee.com/dashboard"),
            credential: CredentialRule::Required,
            token_format: Some(TokenFormat {
                length: Some(80),
                pattern: "^[A-Z0-9]{80}$",
                hint: "80 chars long, uppercase letters and numbers",
            }),
            template: RequestTemplate::QueryApi(query_api(
                "https://app.scrapingbee.com/api/v1",
                "api_key",
            )),
            settings: vec![
                SettingDef::boolean("premium_proxy", "Premium Proxy", PREMIUM_NOTE, false),
                SettingDef::select(
                    "country_code",
                    "Country",
                    REQUIRES_PREMIUM,
                    "us",
                    &[
                        "us", "fr", "de", "dk", "gr", "il", "it", "mx", "nl", "no", "ru", "es",
                        "se", "gb",
                    ],
                ),
            ],
        },
        ServiceDefinition {
            id: SERVICE_SCRAPINGDOG,
            name: "ScrapingDog",
            link: Some("https://www.scrapingdog.com/"),
            dashboard_link: Some("https://api.scrapingdog.com/dashboard"),
            credential: CredentialRule::Required,
            token_format: Some(TokenFormat {
                length: Some(25),
                pattern: "^[a-z0-9]{25}$",
                hint: "25 chars long, lowercase letters and numbers",
            }),
            template: RequestTemplate::QueryApi(QueryApi {
                fixed_params: vec![("dynamic", "false")],
                ..query_api("https://api.scrapingdog.com/scrape", "api_key")
            }),
            settings: vec![
                SettingDef::boolean("premium", "Premium proxy", PREMIUM_NOTE, false),
                SettingDef::select(
                    "country",
                    "Country",
                    REQUIRES_PREMIUM,
                    "random",
                    &[
                        "random", "au", "ca", "cn", "fr", "de", "in", "it", "mx", "ru", "us", "gb",
                    ],
                ),
            ],
        },
        ServiceDefinition {
            id: SERVICE_SCRAPINGOWL,
            name: "ScrapingOwl",
            link: Some("https://scrapeowl.com/"),
            dashboard_link: Some("https://app.scrapeowl.com"),
            credential: CredentialRule::Required,
            token_format: Some(TokenFormat {
                length: Some(30),
                pattern: "^[a-z0-9]{30}$",
                hint: "30 chars long, lowercase letters and numbers",
            }),
            template: RequestTemplate::QueryApi(query_api(
                "https://api.scrapeowl.com/v1/scrape",
                "api_key",
            )),
            settings: vec![
                SettingDef::boolean(
                    "premium_proxies",
                    "Premium proxies",
                    "Premium proxies cost more credits",
                    false,
                ),
                SettingDef::select(
                    "country",
                    "Country",
                    REQUIRES_PREMIUM,
                    "us",
                    &[
                        "us", "ca", "fr", "de", "ge", "il", "it", "mx", "nl", "ru", "es", "se", "uk",
                    ],
                ),
            ],
        },
        ServiceDefinition {
            id: SERVICE_SCRAPERAPI,
            name: "ScraperAPI",
            link: Some("https://www.scraperapi.com/"),
            dashboard_link: Some("https://app.scraperapi.com"),
            credential: CredentialRule::Required,
            token_format: None,
            template: RequestTemplate::QueryApi(query_api("http://api.scraperapi.com", "api_key")),
            settings: vec![
                SettingDef::boolean("premium", "Premium proxy", PREMIUM_NOTE, false),
                SettingDef::boolean(
                    "ultra_premium",
                    "Ultra Premium proxy",
                    "Ultra Premium proxy costs even more credits",
                    false,
                ),
                SettingDef::select(
                    "country_code",
                    "Country",
                    "Requires premium proxy. Other than US, requires Business plan",
                    "us",
                    &[
                        "us", "ca", "uk", "de", "fr", "es", "br", "mx", "in", "jp", "cn", "au",
                    ],
                ),
            ],
        },
        ServiceDefinition {
            id: SERVICE_ZENROWS,
            name: "ZenRows",
            link: Some("https://www.zenrows.com/"),
            dashboard_link: Some("https://app.zenrows.com/analytics"),
            credential: CredentialRule::Required,
            token_format: Some(TokenFormat {
                length: Some(40),
                pattern: "^[a-z0-9]{40}$",
                hint: "40 chars long, lowercase letters and numbers",
            }),
            // The auth parameter is all lowercase for this vendor
            template: RequestTemplate::QueryApi(query_api("https://api.zenrows.com/v1/", "apikey")),
            settings: vec![
                SettingDef::boolean("premium_proxy", "Premium proxy", PREMIUM_NOTE, false),
                SettingDef::boolean(
                    "antibot",
                    "Antibot",
                    "Antibot costs more credits and requires paid plan",
                    false,
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::settings::{resolve_settings, SettingKind, SettingValue};

    #[test]
    fn test_builtin_ids_in_order() {
        assert_eq!(
            ServiceRegistry::builtin().ids(),
            vec![
                "fetch",
                "apify",
                "scrapingbee",
                "scrapingdog",
                "scrapingowl",
                "scraperapi",
                "zenrows"
            ]
        );
    }

    #[test]
    fn test_only_fetch_is_credential_optional() {
        for service in ServiceRegistry::builtin().iter() {
            assert_eq!(
                service.requires_credential(),
                service.id != SERVICE_FETCH,
                "{}",
                service.id
            );
        }
    }

    #[test]
    fn test_select_defaults_are_valid_options() {
        for service in ServiceRegistry::builtin().iter() {
            for def in &service.settings {
                if let SettingKind::Select(options) = &def.kind {
                    let SettingValue::Text(default) = &def.default else {
                        panic!("select default of {}.{} is not text", service.id, def.key);
                    };
                    assert!(options.contains(&default.as_str()), "{}.{}", service.id, def.key);
                }
            }
        }
    }

    #[test]
    fn test_apify_url_uses_proxy_server_parameters() {
        let apify = ServiceRegistry::builtin()
            .get(SERVICE_APIFY)
            .expect("apify registered");
        let settings = resolve_settings("apify", &apify.settings, None).expect("resolves");
        let url = apify
            .build_url("https://example.com", Some("key"), &settings)
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://apify-proxy-aas.fly.dev/scrape?apiKey=key&targetUrl=https%3A%2F%2Fexample.com&advanced=groups-RESIDENTIAL"
        );
    }

    #[test]
    fn test_zenrows_uses_lowercase_auth_param() {
        let zenrows = ServiceRegistry::builtin()
            .get(SERVICE_ZENROWS)
            .expect("zenrows registered");
        let settings = resolve_settings("zenrows", &zenrows.settings, None).expect("resolves");
        let url = zenrows
            .build_url("https://example.com", Some("tok"), &settings)
            .expect("url builds");
        assert!(url.as_str().starts_with("https://api.zenrows.com/v1/?apikey=tok&url="));
        assert!(url.as_str().ends_with("premium_proxy=false&antibot=false"));
    }

    #[test]
    fn test_builtin_with_apify_endpoint() {
        let registry = ServiceRegistry::builtin_with_apify_endpoint("http://localhost:8080/scrape");
        assert_eq!(registry.len(), ServiceRegistry::builtin().len());
        let apify = registry.get(SERVICE_APIFY).expect("apify registered");
        match &apify.template {
            RequestTemplate::QueryApi(api) => {
                assert_eq!(api.base_url, "http://localhost:8080/scrape")
            }
            RequestTemplate::Direct => panic!("apify should be a query api"),
        }
        // Registration order is unchanged by the replacement
        assert_eq!(registry.ids()[1], SERVICE_APIFY);
    }
}
