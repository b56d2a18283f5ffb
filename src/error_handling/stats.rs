//! Run statistics tracking.
//!
//! Thread-safe counters for how attempts settled: failures per `FailureKind`
//! and successes per HTTP status class.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;
use crate::results::StatusClass;

/// Thread-safe run statistics tracker.
///
/// All counters are created up front so increments never allocate, and the
/// struct can be shared across tasks through an `Arc`.
pub struct RunStats {
    failures: HashMap<FailureKind, AtomicUsize>,
    statuses: HashMap<StatusClass, AtomicUsize>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let failures = FailureKind::iter()
            .map(|kind| (kind, AtomicUsize::new(0)))
            .collect();
        let statuses = StatusClass::iter()
            .map(|class| (class, AtomicUsize::new(0)))
            .collect();
        RunStats { failures, statuses }
    }

    /// Records a failed attempt.
    pub fn record_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("Failure kind {:?} missing from RunStats", kind);
        }
    }

    /// Records a response, classified by its status code.
    pub fn record_status(&self, status: u16) {
        let class = StatusClass::from_status(status);
        if let Some(counter) = self.statuses.get(&class) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("Status class {:?} missing from RunStats", class);
        }
    }

    /// Count of failures of one kind.
    pub fn get_failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Count of responses in one status class.
    pub fn get_status_count(&self, class: StatusClass) -> usize {
        self.statuses
            .get(&class)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total failed attempts.
    pub fn total_failures(&self) -> usize {
        FailureKind::iter().map(|k| self.get_failure_count(k)).sum()
    }

    /// Total attempts that received a response (any status).
    pub fn total_responses(&self) -> usize {
        StatusClass::iter().map(|c| self.get_status_count(c)).sum()
    }
}
