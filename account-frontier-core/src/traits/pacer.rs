//! Cancellable pauses between probes and batches

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Pacer Trait
///
/// Every wait in the tracker goes through this trait so tests can run the
/// loops without wall-clock delays.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait for `duration` or until `cancel` fires, whichever comes first.
    ///
    /// Returns `false` when the wait ended because of cancellation.
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool;
}

/// Pacer backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        if duration.is_zero() {
            return true;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleeps_full_duration() {
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        assert!(TokioPacer.pause(Duration::from_secs(3), &cancel).await);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!TokioPacer.pause(Duration::from_secs(3600), &cancel).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_wait() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        assert!(!TokioPacer.pause(Duration::from_secs(3600), &cancel).await);
    }
}
