//! Scraping service descriptors.
//!
//! Each vendor is described declaratively (endpoint, auth parameter, settings
//! schema, token format) and turned into a request URL by one generic builder.

mod credentials;
mod definition;
mod registry;
mod settings;

pub use credentials::{token_env_var, Credentials};
pub use definition::{
    CredentialRule, ParamRemap, QueryApi, RequestTemplate, ServiceDefinition, TokenFormat,
};
pub use registry::ServiceRegistry;
pub use settings::{resolve_settings, ResolvedSettings, SettingDef, SettingKind, SettingValue};
