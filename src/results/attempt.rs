//! The attempt record and its lifecycle states.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use strum_macros::EnumIter as EnumIterMacro;

use super::headers::ResponseHeaders;
use crate::error_handling::FailureKind;

/// One tracked request to one service.
///
/// Created `Pending` before the request is sent and settled exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Unique key, `<service>-<start millis>`
    pub key: String,
    /// Service id
    pub service: String,
    /// Creation time, RFC 3339 with milliseconds
    pub timestamp: String,
    /// Lifecycle state with the settled fields
    #[serde(flatten)]
    pub state: AttemptState,
}

/// Where an attempt is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum AttemptState {
    /// Created, no response yet
    Pending,
    /// A response was received (any HTTP status)
    Succeeded(SuccessDetails),
    /// The request could not be made or did not complete
    Failed(FailureDetails),
}

/// Fields recorded when a response arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDetails {
    /// Milliseconds from creation to settlement
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// `Content-Length` header if parseable, else buffered body length
    pub content_length: u64,
    /// Response headers
    pub headers: ResponseHeaders,
    /// Body decoded as text
    pub body: String,
    /// Body parsed as JSON, when it is JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_body: Option<Value>,
}

/// Fields recorded when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    /// Milliseconds from creation to settlement
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Failure category
    pub kind: FailureKind,
    /// Error message text
    pub error_message: String,
}

/// The terminal state an `update` moves an attempt into.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// See [`AttemptState::Succeeded`]
    Succeeded(SuccessDetails),
    /// See [`AttemptState::Failed`]
    Failed(FailureDetails),
}

impl AttemptOutcome {
    /// Shorthand for a failed outcome.
    pub fn failed(duration_ms: u64, kind: FailureKind, message: impl Into<String>) -> Self {
        AttemptOutcome::Failed(FailureDetails {
            duration_ms,
            kind,
            error_message: message.into(),
        })
    }

    /// True for `Succeeded`.
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Succeeded(_))
    }
}

impl From<AttemptOutcome> for AttemptState {
    fn from(outcome: AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::Succeeded(details) => AttemptState::Succeeded(details),
            AttemptOutcome::Failed(details) => AttemptState::Failed(details),
        }
    }
}

/// Builds the attempt key for a service and a start time.
pub fn attempt_key(service: &str, started_at: DateTime<Utc>) -> String {
    format!("{}-{}", service, started_at.timestamp_millis())
}

impl Attempt {
    /// Creates a pending attempt started at `started_at`.
    pub fn pending(service: &str, started_at: DateTime<Utc>) -> Self {
        Self::pending_with_key(attempt_key(service, started_at), service, started_at)
    }

    /// Creates a pending attempt with an explicit key.
    pub fn pending_with_key(key: String, service: &str, started_at: DateTime<Utc>) -> Self {
        Attempt {
            key,
            service: service.to_string(),
            timestamp: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            state: AttemptState::Pending,
        }
    }

    /// True while no response or failure has been recorded.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, AttemptState::Pending)
    }

    /// Duration in milliseconds, once settled.
    pub fn duration_ms(&self) -> Option<u64> {
        match &self.state {
            AttemptState::Pending => None,
            AttemptState::Succeeded(s) => Some(s.duration_ms),
            AttemptState::Failed(f) => Some(f.duration_ms),
        }
    }

    /// HTTP status, once a response arrived.
    pub fn status(&self) -> Option<u16> {
        match &self.state {
            AttemptState::Succeeded(s) => Some(s.status),
            _ => None,
        }
    }

    /// Failure kind, if the attempt failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.state {
            AttemptState::Failed(f) => Some(f.kind),
            _ => None,
        }
    }
}

/// Coarse class of an HTTP status, used for colouring and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// Everything else (5xx and non-standard codes)
    ServerError,
}

impl StatusClass {
    /// Classifies a status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_pending_attempt_key_and_timestamp() {
        let attempt = Attempt::pending("scrapingbee", start());
        assert_eq!(attempt.key, "scrapingbee-1700000000123");
        assert_eq!(attempt.timestamp, "2023-11-14T22:13:20.123Z");
        assert!(attempt.is_pending());
        assert_eq!(attempt.duration_ms(), None);
    }

    #[test]
    fn test_status_class_boundaries() {
        assert_eq!(StatusClass::from_status(200), StatusClass::Success);
        assert_eq!(StatusClass::from_status(299), StatusClass::Success);
        assert_eq!(StatusClass::from_status(301), StatusClass::Redirect);
        assert_eq!(StatusClass::from_status(404), StatusClass::ClientError);
        assert_eq!(StatusClass::from_status(500), StatusClass::ServerError);
        assert_eq!(StatusClass::from_status(101), StatusClass::ServerError);
    }

    #[test]
    fn test_failed_attempt_serialization() {
        let mut attempt = Attempt::pending("zenrows", start());
        attempt.state =
            AttemptOutcome::failed(0, FailureKind::MissingCredential, "No token for ZenRows")
                .into();
        let json = serde_json::to_value(&attempt).expect("attempt serializes");
        assert_eq!(json["state"], "Failed");
        assert_eq!(json["kind"], "MissingCredential");
        assert_eq!(json["errorMessage"], "No token for ZenRows");
        assert_eq!(json["duration"], 0);
        assert_eq!(json["key"], "zenrows-1700000000123");
    }

    #[test]
    fn test_succeeded_attempt_serialization_skips_missing_parsed_body() {
        let mut attempt = Attempt::pending("fetch", start());
        attempt.state = AttemptState::Succeeded(SuccessDetails {
            duration_ms: 12,
            status: 200,
            status_text: "OK".to_string(),
            content_length: 5,
            headers: ResponseHeaders::new(),
            body: "hello".to_string(),
            parsed_body: None,
        });
        let json = serde_json::to_value(&attempt).expect("attempt serializes");
        assert_eq!(json["state"], "Succeeded");
        assert_eq!(json["statusText"], "OK");
        assert_eq!(json["contentLength"], 5);
        assert!(json.get("parsedBody").is_none());
    }
}
