//! Forward polling service
//!
//! Scans a fixed window of ids just above the frontier, batch after batch,
//! and moves the frontier forward whenever one of them turns out to exist.

use std::sync::Arc;

use account_frontier_prober::ProbeOutcome;
use tokio_util::sync::CancellationToken;

use crate::types::BatchReport;

use super::TrackerContext;

/// Polling service
pub struct PollingService {
    ctx: Arc<TrackerContext>,
}

impl PollingService {
    /// Create polling service instance
    #[must_use]
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self { ctx }
    }

    /// Scan one window above the current frontier.
    ///
    /// The window is fixed when the batch starts; a discovery inside it does
    /// not extend it. Without an established frontier the batch is empty.
    pub async fn run_batch(&self, cancel: &CancellationToken) -> BatchReport {
        let Some(current) = self.ctx.cell.current().await else {
            return BatchReport::default();
        };

        let window_start = current.id.saturating_add(1);
        let window_end = current.id.saturating_add(self.ctx.settings.window_size);
        let mut report = BatchReport {
            window_start,
            ..BatchReport::default()
        };
        if window_start <= current.id {
            // id space exhausted
            return report;
        }

        for id in window_start..=window_end {
            if cancel.is_cancelled() {
                break;
            }
            if id > window_start && !self.ctx.pause(self.ctx.settings.probe_delay, cancel).await {
                break;
            }
            report.scanned += 1;

            match self.ctx.probe(id).await {
                ProbeOutcome::Found(record) => {
                    report.found += 1;
                    if let Some(record) = self.ctx.cell.advance(record).await {
                        log::info!("New account discovered: {} ({})", record.id, record.username);
                        self.ctx.persist(&record).await;
                        report.advanced_to = Some(record.id);
                    }
                }
                ProbeOutcome::Absent => report.absent += 1,
                ProbeOutcome::Indeterminate(e) => {
                    report.indeterminate += 1;
                    log::debug!("Skipping {id} this batch: {e}");
                }
            }
        }

        log::debug!(
            "Batch [{window_start}, {window_end}]: scanned {}, found {}, absent {}, indeterminate {}",
            report.scanned,
            report.found,
            report.absent,
            report.indeterminate
        );
        report
    }

    /// Poll until cancelled, pausing `poll_interval` between batches.
    pub async fn run(&self, cancel: &CancellationToken) {
        log::info!(
            "Forward polling started (window {}, interval {}ms)",
            self.ctx.settings.window_size,
            self.ctx.settings.poll_interval.as_millis()
        );
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.run_batch(cancel).await;
            if !self.ctx.pause(self.ctx.settings.poll_interval, cancel).await {
                break;
            }
        }
        log::info!("Forward polling stopped");
    }
}
