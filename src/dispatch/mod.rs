//! Concurrent fan-out of one target URL across the selected services.
//!
//! A run pushes one pending attempt per service before any request is polled,
//! then drives every request to completion in a single task and settles each
//! attempt exactly once. One service failing never affects another.

mod body;
mod response;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use url::Url;

pub use body::{content_length, BufferedBody};
pub use response::ServiceResponse;

use crate::config::SettingsByService;
use crate::error_handling::{
    categorize_reqwest_error, describe_error, DispatchError, FailureKind, RunStats, StoreError,
};
use crate::results::{attempt_key, Attempt, AttemptOutcome, SharedResultStore};
use crate::services::{resolve_settings, Credentials, ResolvedSettings, ServiceDefinition, ServiceRegistry};

/// Outcome counts of one `run_all` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Keys of the attempts this run created, in selection order
    pub keys: Vec<String>,
    /// Attempts that received a response (any status)
    pub succeeded: usize,
    /// Attempts that failed, missing credentials included
    pub failed: usize,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of attempts created.
    pub fn total(&self) -> usize {
        self.keys.len()
    }
}

/// One selected service, validated and ready to push.
struct Planned<'a> {
    service: &'a ServiceDefinition,
    settings: ResolvedSettings,
    credential: Option<&'a str>,
}

/// Issues requests for a set of services and reports them to a result store.
pub struct Dispatcher {
    client: Arc<reqwest::Client>,
    registry: ServiceRegistry,
    store: SharedResultStore,
    stats: RunStats,
}

impl Dispatcher {
    /// Creates a dispatcher recording into `store`.
    pub fn new(client: Arc<reqwest::Client>, registry: ServiceRegistry, store: SharedResultStore) -> Self {
        Dispatcher {
            client,
            registry,
            store,
            stats: RunStats::new(),
        }
    }

    /// The store attempts are recorded in.
    pub fn store(&self) -> &SharedResultStore {
        &self.store
    }

    /// The services this dispatcher knows.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Failure and status counters accumulated over every run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Requests `target_url` through every service in `selected`, concurrently.
    ///
    /// Returns once every attempt has settled.
    ///
    /// # Errors
    ///
    /// Fails before anything is pushed when the selection is empty, names an
    /// unknown service, or has settings that do not resolve. Per-service
    /// failures (missing token, transport errors) are recorded as failed
    /// attempts instead.
    pub async fn run_all(
        &self,
        target_url: &str,
        selected: &[String],
        credentials: &Credentials,
        settings: &SettingsByService,
    ) -> Result<RunSummary, DispatchError> {
        let run_started = Instant::now();
        let plan = self.plan(selected, credentials, settings)?;
        info!(
            "Dispatching {} to {} service(s): {}",
            target_url,
            plan.len(),
            plan.iter().map(|p| p.service.id).collect::<Vec<_>>().join(", ")
        );

        // Every push happens here, before any request future is polled
        let mut keys = Vec::with_capacity(plan.len());
        let mut requests = Vec::with_capacity(plan.len());
        let mut missing_credentials = 0;
        for planned in plan {
            let created_at = Utc::now();
            let started = Instant::now();
            let key = match self.push_pending(planned.service.id, created_at) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Could not record attempt for {}: {}", planned.service.id, e);
                    continue;
                }
            };
            keys.push(key.clone());

            let credential = match planned.credential {
                None if planned.service.requires_credential() => {
                    warn!("No token for {}, skipping request", planned.service.name);
                    let outcome = AttemptOutcome::failed(
                        elapsed_ms(started),
                        FailureKind::MissingCredential,
                        format!("No token for {}. Please provide a token", planned.service.name),
                    );
                    self.settle(&key, outcome);
                    missing_credentials += 1;
                    continue;
                }
                credential => credential,
            };

            if let (Some(format), Some(token)) = (&planned.service.token_format, credential) {
                if let Some(problem) = format.check(token) {
                    warn!("{} {}", planned.service.name, problem);
                }
            }

            let request = planned
                .service
                .build_url(target_url, credential, &planned.settings);
            requests.push(self.execute(key, planned.service.id, request, started));
        }

        let settled = join_all(requests).await;
        let succeeded = settled.iter().filter(|ok| **ok).count();
        let summary = RunSummary {
            failed: keys.len() - succeeded,
            succeeded,
            keys,
            elapsed: run_started.elapsed(),
        };
        info!(
            "Run finished in {:.2}s: {} succeeded, {} failed ({} missing token)",
            summary.elapsed.as_secs_f64(),
            summary.succeeded,
            summary.failed,
            missing_credentials
        );
        Ok(summary)
    }

    /// Validates the selection and resolves settings without side effects.
    fn plan<'a>(
        &'a self,
        selected: &[String],
        credentials: &'a Credentials,
        settings: &SettingsByService,
    ) -> Result<Vec<Planned<'a>>, DispatchError> {
        if selected.is_empty() {
            return Err(DispatchError::NoServicesSelected);
        }

        let mut plan: Vec<Planned<'a>> = Vec::with_capacity(selected.len());
        for id in selected {
            if plan.iter().any(|p| p.service.id == id.as_str()) {
                debug!("Service {} selected twice, dispatching once", id);
                continue;
            }
            let service = self
                .registry
                .get(id)
                .ok_or_else(|| DispatchError::UnknownService(id.clone()))?;
            let resolved = resolve_settings(service.id, &service.settings, settings.get(service.id))?;
            plan.push(Planned {
                service,
                settings: resolved,
                credential: credentials.get(service.id),
            });
        }
        Ok(plan)
    }

    /// `<service>-<millis>`, suffixed with `-1`, `-2`, ... if already taken.
    fn unique_key(&self, service: &str, created_at: DateTime<Utc>) -> String {
        let base = attempt_key(service, created_at);
        if !self.store.contains_key(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.store.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Pushes a pending attempt under a fresh key, retrying when another run
    /// sharing the store took the key in the meantime.
    fn push_pending(&self, service: &str, created_at: DateTime<Utc>) -> Result<String, StoreError> {
        loop {
            let key = self.unique_key(service, created_at);
            match self
                .store
                .push(Attempt::pending_with_key(key.clone(), service, created_at))
            {
                Ok(()) => return Ok(key),
                Err(StoreError::DuplicateKey(taken)) => {
                    debug!("Attempt key {} taken concurrently, retrying", taken);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute(
        &self,
        key: String,
        service: &'static str,
        request: Result<Url, url::ParseError>,
        started: Instant,
    ) -> bool {
        let outcome = match request {
            Err(e) => AttemptOutcome::failed(
                elapsed_ms(started),
                FailureKind::InvalidUrl,
                format!("Invalid request URL: {}", e),
            ),
            Ok(url) => {
                debug!("{} requesting {}{}", service, url.origin().ascii_serialization(), url.path());
                match self.send(url).await {
                    Ok(response) => {
                        debug!("{} answered {} {}", service, response.status, response.status_text);
                        AttemptOutcome::Succeeded(response.into_success(elapsed_ms(started)))
                    }
                    Err(e) => {
                        let kind = categorize_reqwest_error(&e);
                        // The request URL carries the service token
                        let message = describe_error(&e.without_url());
                        warn!("{} failed ({}): {}", service, kind, message);
                        AttemptOutcome::failed(elapsed_ms(started), kind, message)
                    }
                }
            }
        };
        self.settle(&key, outcome)
    }

    async fn send(&self, url: Url) -> Result<ServiceResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        ServiceResponse::read(response).await
    }

    /// Records `outcome` for `key`; returns true for a success.
    fn settle(&self, key: &str, outcome: AttemptOutcome) -> bool {
        let succeeded = match &outcome {
            AttemptOutcome::Succeeded(details) => {
                self.stats.record_status(details.status);
                true
            }
            AttemptOutcome::Failed(details) => {
                self.stats.record_failure(details.kind);
                false
            }
        };
        if let Err(e) = self.store.update(key, outcome) {
            warn!("Could not record result for {}: {}", key, e);
        }
        succeeded
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
