//! Case-insensitive response header mapping.

use std::collections::BTreeMap;

use serde::Serialize;

/// Response headers keyed by lower-cased name.
///
/// Repeated headers are folded into one comma-separated value, the way the
/// Fetch API's `Headers` exposes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, String>);

impl ResponseHeaders {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the mapping from an HTTP header map.
    ///
    /// Values that are not visible ASCII are decoded lossily rather than dropped.
    pub fn from_header_map(headers: &reqwest::header::HeaderMap) -> Self {
        let mut folded = Self::new();
        for (name, value) in headers {
            folded.append(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        folded
    }

    /// Adds a header, folding it into an existing value of the same name.
    pub fn append(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Looks a header up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};

    #[test]
    fn test_get_is_case_insensitive() {
        let headers: ResponseHeaders = [("Content-Type", "application/json")]
            .into_iter()
            .collect();
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.get("content-length"), None);
    }

    #[test]
    fn test_repeated_headers_are_folded() {
        let mut map = HeaderMap::new();
        map.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        map.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        let headers = ResponseHeaders::from_header_map(&map);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Set-Cookie"), Some("a=1, b=2"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let headers: ResponseHeaders = [("X-Test", "1")].into_iter().collect();
        let json = serde_json::to_value(&headers).expect("headers serialize");
        assert_eq!(json, serde_json::json!({ "x-test": "1" }));
    }
}
