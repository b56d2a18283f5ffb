//! Progress logging driven by result store events.

use log::{debug, info, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::results::{SharedResultStore, StoreEvent};

/// Logs one line per settled attempt until `cancel` fires or the store is dropped.
///
/// # Arguments
///
/// * `events` - Receiver from `SharedResultStore::subscribe`, taken before the run starts
/// * `store` - Store the events come from, read for the pending count
/// * `cancel` - Stops the task
pub fn spawn_progress_logger(
    mut events: broadcast::Receiver<StoreEvent>,
    store: SharedResultStore,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // Queued events are drained before cancellation is honoured
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Ok(event) => log_event(&event, &store),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Progress logger skipped {} store events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = cancel.cancelled() => break,
            }
        }
    })
}

fn log_event(event: &StoreEvent, store: &SharedResultStore) {
    match event {
        StoreEvent::Pushed { key, .. } => debug!("{} pending", key),
        StoreEvent::Updated {
            key, succeeded, ..
        } => {
            let attempt = store.get(key);
            let detail = match attempt.as_ref() {
                Some(a) if *succeeded => format!(
                    "status {} in {} ms",
                    a.status().unwrap_or_default(),
                    a.duration_ms().unwrap_or_default()
                ),
                Some(a) => format!(
                    "failed ({}) in {} ms",
                    a.failure_kind().map(|k| k.as_str()).unwrap_or("unknown"),
                    a.duration_ms().unwrap_or_default()
                ),
                None => "settled".to_string(),
            };
            info!("{} {}, {} still pending", key, detail, store.pending_count());
        }
        StoreEvent::Cleared { service, removed } => debug!(
            "Cleared {} attempt(s) of {}",
            removed,
            service.as_deref().unwrap_or("all services")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FailureKind;
    use crate::results::{Attempt, AttemptOutcome};
    use chrono::Utc;

    #[tokio::test]
    async fn test_progress_logger_stops_on_cancel() {
        let store = SharedResultStore::new();
        let cancel = CancellationToken::new();
        let task = spawn_progress_logger(store.subscribe(), store.clone(), cancel.clone());

        let attempt = Attempt::pending("fetch", Utc::now());
        let key = attempt.key.clone();
        store.push(attempt).expect("push");
        store
            .update(&key, AttemptOutcome::failed(1, FailureKind::Timeout, "timed out"))
            .expect("update");
        store.clear(Some("fetch"));

        cancel.cancel();
        task.await.expect("logger task finishes");
    }
}
