//! Error type definitions.
//!
//! This module defines the error enums of every layer plus the failure kinds an
//! attempt can settle with.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors in user-supplied configuration (CLI arguments, settings, tokens).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A service id that is not in the registry.
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// A setting key the service does not declare.
    #[error("Service '{service}' has no setting '{key}'")]
    UnknownSetting {
        /// Service id
        service: String,
        /// Undeclared key
        key: String,
    },

    /// A setting value of the wrong kind, or a select value outside its options.
    #[error("Invalid value '{value}' for {service}.{key}: expected {expected}")]
    InvalidSettingValue {
        /// Service id
        service: String,
        /// Setting key
        key: String,
        /// Rejected value
        value: String,
        /// Accepted values, e.g. `true|false`
        expected: String,
    },

    /// A `--token` argument not of the form `service=token`.
    #[error("Invalid token argument '{0}', expected <service>=<token>")]
    InvalidTokenArgument(String),

    /// A `--setting` argument not of the form `service.key=value`.
    #[error("Invalid setting argument '{0}', expected <service>.<key>=<value>")]
    InvalidSettingArgument(String),
}

/// Conditions that abort a whole run before anything is recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The selection was empty.
    #[error("No services selected, please select at least one service")]
    NoServicesSelected,

    /// The selection named a service the registry does not know.
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// Settings for one of the selected services did not resolve.
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] ConfigError),
}

/// Result store contract violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `push` with a key that is already present.
    #[error("Attempt key '{0}' already exists")]
    DuplicateKey(String),

    /// `push` with an attempt that is not pending.
    #[error("Attempt '{0}' must be pending when pushed")]
    NotPending(String),

    /// `update` for a key that was never pushed (or was cleared).
    #[error("No attempt with key '{0}'")]
    KeyNotFound(String),

    /// `update` for an attempt that already reached a terminal state.
    #[error("Attempt '{0}' has already settled")]
    AlreadySettled(String),
}

/// Why an attempt ended in the `Failed` state.
///
/// Everything except `MissingCredential` is a transport failure; HTTP error
/// statuses are never a failure kind because any response counts as a success
/// at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
pub enum FailureKind {
    /// A credentialed service was selected without a token; nothing was sent.
    MissingCredential,
    /// The request URL could not be built.
    InvalidUrl,
    /// The request did not complete before the timeout.
    Timeout,
    /// Connecting (DNS, TCP, TLS or the forward proxy handshake) failed.
    Connect,
    /// The request could not be sent.
    Request,
    /// Reading the response body failed.
    Body,
    /// Redirect loop or redirect limit.
    Redirect,
    /// Anything else.
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingCredential => "Missing credential",
            FailureKind::InvalidUrl => "Invalid URL",
            FailureKind::Timeout => "Request timeout",
            FailureKind::Connect => "Connection error",
            FailureKind::Request => "Request error",
            FailureKind::Body => "Response body error",
            FailureKind::Redirect => "Redirect error",
            FailureKind::Other => "Other error",
        }
    }

    /// Short machine-readable code, used as `statusMessage` by the proxy server.
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::MissingCredential => "ERR_MISSING_CREDENTIAL",
            FailureKind::InvalidUrl => "ERR_INVALID_URL",
            FailureKind::Timeout => "ETIMEDOUT",
            FailureKind::Connect => "ECONNREFUSED",
            FailureKind::Request => "ERR_REQUEST",
            FailureKind::Body => "ERR_BODY",
            FailureKind::Redirect => "ERR_TOO_MANY_REDIRECTS",
            FailureKind::Other => "ERR_UNKNOWN",
        }
    }
}
