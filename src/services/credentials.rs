//! API tokens keyed by service id.

use std::collections::BTreeMap;

use crate::config::TOKEN_ENV_SUFFIX;

/// Environment variable holding a service's token, e.g. `SCRAPINGBEE_TOKEN`.
pub fn token_env_var(service: &str) -> String {
    format!(
        "{}{}",
        service.to_ascii_uppercase().replace('-', "_"),
        TOKEN_ENV_SUFFIX
    )
}

/// Tokens per service. Empty tokens count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    /// No tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token of `service`.
    pub fn insert(&mut self, service: impl Into<String>, token: impl Into<String>) {
        self.0.insert(service.into(), token.into());
    }

    /// The token of `service`, if non-empty after trimming.
    pub fn get(&self, service: &str) -> Option<&str> {
        self.0
            .get(service)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }

    /// Reads `<SERVICE>_TOKEN` for every id through `lookup`.
    pub fn from_lookup<'a, F>(services: impl IntoIterator<Item = &'a str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::new();
        for service in services {
            if let Some(token) = lookup(&token_env_var(service)) {
                credentials.insert(service, token);
            }
        }
        credentials
    }

    /// Reads `<SERVICE>_TOKEN` environment variables.
    pub fn from_env<'a>(services: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_lookup(services, |var| std::env::var(var).ok())
    }

    /// Overlays `other`; its non-empty tokens win.
    pub fn merge(mut self, other: Credentials) -> Self {
        for (service, token) in other.0 {
            if !token.trim().is_empty() {
                self.0.insert(service, token);
            }
        }
        self
    }

    /// Service ids that have a usable token.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(s, _)| s.as_str())
    }
}

impl From<BTreeMap<String, String>> for Credentials {
    fn from(map: BTreeMap<String, String>) -> Self {
        Credentials(map)
    }
}
