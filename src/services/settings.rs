//! Typed per-service settings and their resolution against a schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error_handling::ConfigError;

/// A setting value: a flag or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Checkbox-style flag
    Bool(bool),
    /// Free text or a select option
    Text(String),
}

impl SettingValue {
    /// Query-string form: booleans as `"true"`/`"false"`, text as-is.
    pub fn as_query_value(&self) -> String {
        match self {
            SettingValue::Bool(b) => b.to_string(),
            SettingValue::Text(s) => s.clone(),
        }
    }

    /// True for empty text, which is left out of the query string.
    pub fn is_empty(&self) -> bool {
        matches!(self, SettingValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query_value())
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

/// What values a setting accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
    /// `true` / `false`
    Boolean,
    /// Any string
    Text,
    /// One of a fixed list of strings
    Select(Vec<&'static str>),
}

impl SettingKind {
    fn expected(&self) -> String {
        match self {
            SettingKind::Boolean => "true or false".to_string(),
            SettingKind::Text => "text".to_string(),
            SettingKind::Select(options) => format!("one of {}", options.join(", ")),
        }
    }
}

/// One configurable option of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDef {
    /// Key, also the query parameter name unless remapped
    pub key: &'static str,
    /// Display label
    pub label: &'static str,
    /// Cost or plan caveat shown next to the label
    pub note: &'static str,
    /// Accepted values
    pub kind: SettingKind,
    /// Value used when the caller does not override it
    pub default: SettingValue,
}

impl SettingDef {
    /// A boolean setting.
    pub fn boolean(key: &'static str, label: &'static str, note: &'static str, default: bool) -> Self {
        SettingDef {
            key,
            label,
            note,
            kind: SettingKind::Boolean,
            default: SettingValue::Bool(default),
        }
    }

    /// A free-text setting.
    pub fn text(key: &'static str, label: &'static str, note: &'static str, default: &str) -> Self {
        SettingDef {
            key,
            label,
            note,
            kind: SettingKind::Text,
            default: SettingValue::from(default),
        }
    }

    /// A select setting; `default` should be one of `options`.
    pub fn select(
        key: &'static str,
        label: &'static str,
        note: &'static str,
        default: &str,
        options: &[&'static str],
    ) -> Self {
        SettingDef {
            key,
            label,
            note,
            kind: SettingKind::Select(options.to_vec()),
            default: SettingValue::from(default),
        }
    }

    /// Checks `value` against this setting's kind.
    ///
    /// A text value for a boolean setting is accepted when it reads as
    /// `true`/`false`, so CLI input does not have to be pre-typed.
    pub fn coerce(&self, service: &str, value: &SettingValue) -> Result<SettingValue, ConfigError> {
        let invalid = || ConfigError::InvalidSettingValue {
            service: service.to_string(),
            key: self.key.to_string(),
            value: value.to_string(),
            expected: self.kind.expected(),
        };

        match (&self.kind, value) {
            (SettingKind::Boolean, SettingValue::Bool(_)) => Ok(value.clone()),
            (SettingKind::Boolean, SettingValue::Text(s)) => {
                parse_bool(s).map(SettingValue::Bool).ok_or_else(invalid)
            }
            (SettingKind::Text, SettingValue::Text(_)) => Ok(value.clone()),
            (SettingKind::Select(options), SettingValue::Text(s)) => {
                if options.contains(&s.as_str()) {
                    Ok(value.clone())
                } else {
                    Err(invalid())
                }
            }
            (_, SettingValue::Bool(_)) => Err(invalid()),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Effective settings of one service, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSettings(Vec<(&'static str, SettingValue)>);

impl ResolvedSettings {
    /// Looks a value up by key.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Iterates `(key, value)` in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the service has no settings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Overlays `overrides` on the schema defaults.
///
/// Unknown keys, wrong kinds and select values outside the options are errors.
pub fn resolve_settings(
    service: &str,
    schema: &[SettingDef],
    overrides: Option<&BTreeMap<String, SettingValue>>,
) -> Result<ResolvedSettings, ConfigError> {
    if let Some(overrides) = overrides {
        if let Some(unknown) = overrides
            .keys()
            .find(|key| !schema.iter().any(|def| def.key == key.as_str()))
        {
            return Err(ConfigError::UnknownSetting {
                service: service.to_string(),
                key: unknown.clone(),
            });
        }
    }

    let mut resolved = Vec::with_capacity(schema.len());
    for def in schema {
        let value = match overrides.and_then(|o| o.get(def.key)) {
            Some(value) => def.coerce(service, value)?,
            None => def.default.clone(),
        };
        resolved.push((def.key, value));
    }
    Ok(ResolvedSettings(resolved))
}
