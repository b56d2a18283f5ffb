//! Declarative service descriptors and the generic request builder.

use regex::Regex;
use url::Url;

use super::settings::{ResolvedSettings, SettingDef};

/// Whether a service needs an API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRule {
    /// Requests are refused locally without a token
    Required,
    /// The service works without one
    Optional,
}

/// Expected shape of a service's API token.
///
/// Only used for warnings; a token that does not match is still sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFormat {
    /// Exact length, when the vendor documents one
    pub length: Option<usize>,
    /// Anchored pattern the token should match
    pub pattern: &'static str,
    /// Human description, e.g. "25 chars long, lowercase letters and numbers"
    pub hint: &'static str,
}

impl TokenFormat {
    /// Returns a description of the mismatch, or `None` if `token` looks right.
    pub fn check(&self, token: &str) -> Option<String> {
        if let Some(expected) = self.length {
            let actual = token.chars().count();
            if actual != expected {
                return Some(format!(
                    "token is {} chars long, expected {} ({})",
                    actual, expected, self.hint
                ));
            }
        }
        match Regex::new(self.pattern) {
            Ok(re) if !re.is_match(token) => {
                Some(format!("token does not look right, expected {}", self.hint))
            }
            Ok(_) => None,
            Err(e) => {
                log::debug!("Skipping token check, bad pattern {}: {}", self.pattern, e);
                None
            }
        }
    }
}

/// A query parameter derived from a setting under a different name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRemap {
    /// Setting key
    pub setting: &'static str,
    /// Query parameter it is sent as
    pub param: &'static str,
    /// Prepended to the value
    pub prefix: &'static str,
}

/// A vendor API addressed with query parameters on one GET endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryApi {
    /// Endpoint, without query string
    pub base_url: String,
    /// Parameter carrying the target URL
    pub url_param: &'static str,
    /// Parameter carrying the API token
    pub auth_param: &'static str,
    /// Parameters always sent with the same value
    pub fixed_params: Vec<(&'static str, &'static str)>,
    /// Settings sent under another parameter name
    pub remaps: Vec<ParamRemap>,
}

/// How a service turns a target URL into an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTemplate {
    /// Request the target URL itself
    Direct,
    /// Request a vendor endpoint with the target as a query parameter
    QueryApi(QueryApi),
}

/// Static descriptor of one scraping service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Identifier used on the command line and in attempt keys
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Vendor home page
    pub link: Option<&'static str>,
    /// Usage dashboard
    pub dashboard_link: Option<&'static str>,
    /// Whether a token is needed
    pub credential: CredentialRule,
    /// Expected token shape
    pub token_format: Option<TokenFormat>,
    /// Request builder
    pub template: RequestTemplate,
    /// Settings schema, in display order
    pub settings: Vec<SettingDef>,
}

impl ServiceDefinition {
    /// True when requests need a token.
    pub fn requires_credential(&self) -> bool {
        self.credential == CredentialRule::Required
    }

    /// Same service, with its API endpoint replaced.
    ///
    /// Has no effect on `Direct` services.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        if let RequestTemplate::QueryApi(api) = &mut self.template {
            api.base_url = base_url.into();
        }
        self
    }

    /// Builds the request URL for `target_url`.
    ///
    /// Query parameter order: token, target, settings (empty text skipped,
    /// remapped settings under their new name), then fixed parameters.
    pub fn build_url(
        &self,
        target_url: &str,
        credential: Option<&str>,
        settings: &ResolvedSettings,
    ) -> Result<Url, url::ParseError> {
        let api = match &self.template {
            RequestTemplate::Direct => return Url::parse(target_url),
            RequestTemplate::QueryApi(api) => api,
        };

        let mut url = Url::parse(&api.base_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(api.auth_param, credential.unwrap_or_default());
            query.append_pair(api.url_param, target_url);
            for (key, value) in settings.iter() {
                if value.is_empty() {
                    continue;
                }
                match api.remaps.iter().find(|r| r.setting == key) {
                    Some(remap) => {
                        let remapped = format!("{}{}", remap.prefix, value.as_query_value());
                        query.append_pair(remap.param, &remapped);
                    }
                    None => {
                        query.append_pair(key, &value.as_query_value());
                    }
                }
            }
            for (key, value) in &api.fixed_params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}
