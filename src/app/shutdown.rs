//! Graceful shutdown handling.

use log::{info, warn};
use tokio_util::sync::CancellationToken;

/// Stops the progress logger and waits for it.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
}

/// Returns a token that is cancelled on Ctrl+C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => warn!("Could not listen for Ctrl+C: {}", e),
        }
        cancel.cancel();
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_gracefully_awaits_task() {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let task = tokio::spawn(async move { child.cancelled().await });
        shutdown_gracefully(cancel.clone(), Some(task)).await;
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_gracefully_without_task() {
        shutdown_gracefully(CancellationToken::new(), None).await;
    }
}
