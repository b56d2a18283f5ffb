//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, defaults, service ids, example targets)
//! - HTTP header name constants
//! - Library configuration types
//! - CLI option types and parsing

mod cli;
mod constants;
mod headers;
mod types;

// Re-export all constants
pub use cli::{
    parse_setting_arg, parse_token_arg, Cli, Command, CompareArgs, ProxyArgs, SettingArg, TokenArg,
};
pub use constants::*;
pub use headers::*;
pub use types::{
    CompareConfig, LogFormat, LogLevel, ProxyConfig, ReportFormat, SettingsByService,
};
