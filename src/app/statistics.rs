//! Run statistics logging.

use log::info;
use strum::IntoEnumIterator;

use crate::dispatch::RunSummary;
use crate::error_handling::{FailureKind, RunStats};
use crate::results::StatusClass;

/// Logs failure and status-class counts, then a one-line summary.
pub fn log_run_statistics(summary: &RunSummary, stats: &RunStats) {
    print_failure_statistics(stats);
    print_status_statistics(stats);
    print_simple_summary(summary);
}

/// Logs failed attempts per failure kind.
pub fn print_failure_statistics(stats: &RunStats) {
    let total = stats.total_failures();
    if total > 0 {
        info!("Failure Counts ({} total):", total);
        for kind in FailureKind::iter() {
            let count = stats.get_failure_count(kind);
            if count > 0 {
                info!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}

/// Logs responses per status class.
pub fn print_status_statistics(stats: &RunStats) {
    let total = stats.total_responses();
    if total > 0 {
        info!("Response Counts ({} total):", total);
        for class in StatusClass::iter() {
            let count = stats.get_status_count(class);
            if count > 0 {
                info!("   {:?}: {}", class, count);
            }
        }
    }
}

fn print_simple_summary(summary: &RunSummary) {
    let total = summary.total();
    info!(
        "✅ Queried {} service{} ({} answered, {} failed) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        summary.succeeded,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary() -> RunSummary {
        RunSummary {
            keys: vec!["fetch-1".to_string(), "zenrows-1".to_string()],
            succeeded: 1,
            failed: 1,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_log_run_statistics_empty() {
        // Should not panic with all counters at zero
        log_run_statistics(&summary(), &RunStats::new());
    }

    #[test]
    fn test_log_run_statistics_with_counts() {
        let stats = RunStats::new();
        stats.record_failure(FailureKind::MissingCredential);
        stats.record_status(403);
        log_run_statistics(&summary(), &stats);
        assert_eq!(stats.total_failures(), 1);
        assert_eq!(stats.total_responses(), 1);
    }
}
