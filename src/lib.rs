//! scraping_services_tester library: side-by-side comparison of scraping services
//!
//! This library requests one target URL through several scraping/anti-bot
//! proxy services at once, records every attempt in a result store, and
//! provides the one-route forwarding server the Apify service talks to.
//!
//! # Example
//!
//! ```no_run
//! use scraping_services_tester::{run_compare, CompareConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CompareConfig {
//!     target_url: "https://api.github.com/users/strajk".to_string(),
//!     services: vec!["fetch".to_string()],
//!     ..Default::default()
//! };
//!
//! let report = run_compare(config).await?;
//! println!("{} answered, {} failed", report.summary.succeeded, report.summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod dispatch;
mod error_handling;
pub mod initialization;
pub mod proxy_server;
pub mod results;
pub mod services;

// Re-export public API
pub use app::cancel_on_ctrl_c;
pub use config::{CompareConfig, LogFormat, LogLevel, ProxyConfig, ReportFormat};
pub use dispatch::{Dispatcher, RunSummary};
pub use error_handling::{
    ConfigError, DispatchError, FailureKind, InitializationError, RunStats, StoreError,
};
pub use proxy_server::start_proxy_server;
pub use results::{Attempt, AttemptState, SharedResultStore, StoreEvent};
pub use run::{list_examples, list_services, run_compare, CompareReport};

// Internal run module (contains the comparison entry point)
mod run {
    use anyhow::{Context, Result};
    use tokio_util::sync::CancellationToken;

    use crate::app::report::{
        render_examples, render_json, render_service_list, render_table,
    };
    use crate::app::{log_run_statistics, shutdown_gracefully, spawn_progress_logger};
    use crate::config::{CompareConfig, ReportFormat};
    use crate::dispatch::{Dispatcher, RunSummary};
    use crate::initialization::init_client;
    use crate::results::{Attempt, SharedResultStore};
    use crate::services::{Credentials, ServiceRegistry};

    /// Results of one comparison run.
    #[derive(Debug, Clone)]
    pub struct CompareReport {
        /// Target URL every service was asked for
        pub target_url: String,
        /// Counts and keys of the run
        pub summary: RunSummary,
        /// Every attempt of the run, in creation order
        pub attempts: Vec<Attempt>,
        /// Registry the run used, for display names
        pub registry: ServiceRegistry,
    }

    impl CompareReport {
        /// Renders the attempts as a table or as JSON.
        ///
        /// # Errors
        ///
        /// Returns an error if JSON serialization fails.
        pub fn render(&self, format: ReportFormat) -> Result<String> {
            match format {
                ReportFormat::Table => Ok(render_table(&self.attempts, &self.registry)),
                ReportFormat::Json => {
                    render_json(&self.attempts).context("Failed to serialize attempts")
                }
            }
        }
    }

    /// Requests `config.target_url` through every selected service.
    ///
    /// Each selected service gets one attempt in a fresh result store; the call
    /// returns once all of them have settled. Progress is logged as attempts
    /// settle.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The HTTP client cannot be created
    /// - The selection is empty or names an unknown service
    /// - A setting override does not match the service's schema
    ///
    /// Failures of individual services are not errors; they are recorded as
    /// failed attempts in the report.
    pub async fn run_compare(config: CompareConfig) -> Result<CompareReport> {
        let client = init_client(&config.user_agent, config.timeout_seconds)
            .context("Failed to initialize HTTP client")?;
        let registry = ServiceRegistry::builtin_with_apify_endpoint(&config.apify_endpoint);
        let credentials = Credentials::from(config.tokens.clone());

        let store = SharedResultStore::new();
        let cancel = CancellationToken::new();
        let logging_task = spawn_progress_logger(store.subscribe(), store.clone(), cancel.clone());

        let dispatcher = Dispatcher::new(client, registry, store.clone());
        let result = dispatcher
            .run_all(
                &config.target_url,
                &config.services,
                &credentials,
                &config.settings,
            )
            .await;

        shutdown_gracefully(cancel, Some(logging_task)).await;
        let summary = result.context("Comparison run aborted")?;
        log_run_statistics(&summary, dispatcher.stats());

        Ok(CompareReport {
            target_url: config.target_url,
            attempts: store.all(),
            summary,
            registry: dispatcher.registry().clone(),
        })
    }

    /// Registered services with their settings, as printed by `--list-services`.
    pub fn list_services(apify_endpoint: &str) -> String {
        render_service_list(&ServiceRegistry::builtin_with_apify_endpoint(apify_endpoint))
    }

    /// Example target URLs, as printed by `--list-examples`.
    pub fn list_examples() -> String {
        render_examples()
    }
}
