//! Error handling and run statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, dispatch, store and initialization
//! - `FailureKind`, the reason a failed attempt records
//! - Categorization of transport errors and rendering of error chains
//! - Run statistics (failures per kind, responses per status class)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, describe_error};
pub use stats::RunStats;
pub use types::{
    ConfigError, DispatchError, FailureKind, InitializationError, StoreError,
};
