//! Frontier tracker
//!
//! Ties startup reconciliation, bootstrap and forward polling into a single
//! cancellable driver, and exposes the read side to status consumers.

use std::sync::Arc;

use account_frontier_prober::{AccountRecord, ProbeOutcome};
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::types::{TrackerPhase, TrackerStatus};

use super::{BootstrapService, FrontierCell, PollingService, TrackerContext};

/// Frontier tracker
///
/// The only writer of the frontier cell. Cloning the cell handle via
/// [`FrontierTracker::cell`] is how readers observe progress while
/// [`FrontierTracker::run`] is in flight.
pub struct FrontierTracker {
    ctx: Arc<TrackerContext>,
    bootstrap: BootstrapService,
    polling: PollingService,
}

impl FrontierTracker {
    #[must_use]
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self {
            bootstrap: BootstrapService::new(Arc::clone(&ctx)),
            polling: PollingService::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    pub fn cell(&self) -> Arc<FrontierCell> {
        Arc::clone(&self.ctx.cell)
    }

    /// Current frontier record, if one is established.
    pub async fn current(&self) -> Option<Arc<AccountRecord>> {
        self.ctx.cell.current().await
    }

    pub async fn status(&self) -> TrackerStatus {
        self.ctx.cell.status().await
    }

    /// Adopt the persisted record if it still resolves.
    ///
    /// Returns the adopted record, or `None` when there was nothing usable to
    /// adopt and a bootstrap is needed.
    pub async fn reconcile(&self) -> Option<Arc<AccountRecord>> {
        let cached = match self.ctx.store.load().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::info!("No persisted frontier, bootstrap required");
                return None;
            }
            Err(e) => {
                log::error!("Failed to load persisted frontier, ignoring it: {e}");
                return None;
            }
        };

        log::info!("Verifying persisted frontier {} ({})", cached.id, cached.username);
        match self.ctx.probe(cached.id).await {
            ProbeOutcome::Found(fresh) => {
                let record = self.ctx.cell.replace(fresh).await;
                self.ctx.persist(&record).await;
                log::info!("Resumed from persisted frontier {}", record.id);
                Some(record)
            }
            ProbeOutcome::Absent => {
                log::warn!("Persisted frontier {} no longer exists, discarding", cached.id);
                None
            }
            ProbeOutcome::Indeterminate(e) => {
                log::warn!("Could not verify persisted frontier {}, discarding: {e}", cached.id);
                None
            }
        }
    }

    /// Establish a frontier: reconcile first, bootstrap if that fails.
    pub async fn start(&self, cancel: &CancellationToken) -> CoreResult<Arc<AccountRecord>> {
        self.ctx.cell.set_phase(TrackerPhase::Initializing).await;
        if let Some(record) = self.reconcile().await {
            self.ctx.cell.set_phase(TrackerPhase::Tracking).await;
            return Ok(record);
        }
        self.bootstrap.establish(cancel).await
    }

    /// Run until `cancel` fires, then flush the frontier.
    ///
    /// # Errors
    /// Only configuration problems that make the search range unusable end
    /// the run early; cancellation is a normal return.
    pub async fn run(&self, cancel: CancellationToken) -> CoreResult<()> {
        let result = match self.start(&cancel).await {
            Ok(_) => {
                self.polling.run(&cancel).await;
                Ok(())
            }
            Err(CoreError::Cancelled) => {
                log::info!("Tracker cancelled before a frontier was established");
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.flush().await;
        self.ctx.cell.set_phase(TrackerPhase::Stopped).await;
        log::info!("Tracker stopped");
        result
    }

    /// Persist the current record, if any.
    pub async fn flush(&self) {
        if let Some(record) = self.ctx.cell.current().await {
            self.ctx.persist(&record).await;
        }
    }
}
