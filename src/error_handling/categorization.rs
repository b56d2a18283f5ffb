//! Error categorization.
//!
//! Maps transport errors onto `FailureKind` and renders error chains into the
//! message text stored on failed attempts.

use super::types::FailureKind;

/// Categorizes a `reqwest::Error` into a `FailureKind`.
///
/// Used by both the dispatcher (attempt failure kind) and the proxy server
/// (`statusMessage` code) so the two agree on naming.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FailureKind {
    // Timeout first: a timed out connect is reported as both timeout and connect
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_builder() {
        FailureKind::InvalidUrl
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_redirect() {
        FailureKind::Redirect
    } else if error.is_body() || error.is_decode() {
        FailureKind::Body
    } else if error.is_request() {
        FailureKind::Request
    } else {
        FailureKind::Other
    }
}

/// Renders an error and all of its sources as one line.
///
/// `reqwest` keeps the useful part ("Connection refused", "dns error") in the
/// source chain, while its own `Display` only says "error sending request".
pub fn describe_error(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
