//! Main application modules.
//!
//! This module provides result rendering, progress logging, shutdown handling,
//! and statistics printing used by the library entry points.

pub mod logging;
pub mod report;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::spawn_progress_logger;
pub use shutdown::{cancel_on_ctrl_c, shutdown_gracefully};
pub use statistics::log_run_statistics;
