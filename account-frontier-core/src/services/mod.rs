//! Frontier discovery and tracking services

mod bootstrap_service;
mod frontier_cell;
mod polling_service;
mod tracker_service;

pub use bootstrap_service::BootstrapService;
pub use frontier_cell::FrontierCell;
pub use polling_service::PollingService;
pub use tracker_service::FrontierTracker;

use std::sync::Arc;
use std::time::Duration;

use account_frontier_prober::{AccountProber, AccountRecord, ProbeOutcome};
use tokio_util::sync::CancellationToken;

use crate::traits::{Pacer, RecordStore};
use crate::types::TrackerSettings;

/// Tracker context - holds all dependencies
///
/// The platform layer creates this context and injects the prober, store and
/// pacer it wants the tracker to run with.
pub struct TrackerContext {
    /// Existence prober for the remote service
    pub prober: Arc<dyn AccountProber>,
    /// Durable store of the frontier record
    pub store: Arc<dyn RecordStore>,
    /// Sleep abstraction for every wait
    pub pacer: Arc<dyn Pacer>,
    /// Shared frontier holder, also read by the status surface
    pub cell: Arc<FrontierCell>,
    pub settings: TrackerSettings,
}

impl TrackerContext {
    /// Create a tracker context with a fresh, empty frontier cell
    #[must_use]
    pub fn new(
        prober: Arc<dyn AccountProber>,
        store: Arc<dyn RecordStore>,
        pacer: Arc<dyn Pacer>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            prober,
            store,
            pacer,
            cell: Arc::new(FrontierCell::new()),
            settings,
        }
    }

    /// Issue one probe and count it.
    pub(crate) async fn probe(&self, id: u64) -> ProbeOutcome {
        self.cell.record_probe();
        let outcome = self.prober.probe(id).await;
        log::trace!("probe {id}: {}", outcome.label());
        outcome
    }

    /// Save `record`; failures are logged and otherwise ignored.
    ///
    /// The in-memory frontier stays authoritative for the process lifetime
    /// even when the store is unavailable.
    pub(crate) async fn persist(&self, record: &AccountRecord) {
        match self.store.save(record).await {
            Ok(()) => log::debug!("Persisted frontier account {}", record.id),
            Err(e) => log::error!("Failed to persist frontier account {}: {e}", record.id),
        }
    }

    /// Wait unless cancelled; `false` means cancellation won.
    pub(crate) async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        self.pacer.pause(duration, cancel).await
    }
}
