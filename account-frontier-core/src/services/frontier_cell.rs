//! Shared holder of the current frontier record

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use account_frontier_prober::AccountRecord;

use crate::types::{TrackerPhase, TrackerStatus};

#[derive(Default)]
struct CellState {
    record: Option<Arc<AccountRecord>>,
    phase: TrackerPhase,
    last_advanced_at: Option<DateTime<Utc>>,
}

/// Single owned cell holding the frontier.
///
/// The record is swapped as a whole `Arc`, so a reader holds either the old
/// or the new record, never a mix of both. Only the tracker writes; any
/// number of readers (HTTP handlers) may observe concurrently.
#[derive(Default)]
pub struct FrontierCell {
    state: RwLock<CellState>,
    probes_issued: AtomicU64,
    accounts_discovered: AtomicU64,
}

impl FrontierCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frontier record, if one is established.
    pub async fn current(&self) -> Option<Arc<AccountRecord>> {
        self.state.read().await.record.clone()
    }

    /// Unconditionally install `record` as the frontier.
    ///
    /// Used at startup (reconciliation, bootstrap) where a stale cached value
    /// may legitimately be replaced by a lower one.
    pub async fn replace(&self, record: AccountRecord) -> Arc<AccountRecord> {
        let record = Arc::new(record);
        let mut state = self.state.write().await;
        state.record = Some(Arc::clone(&record));
        state.last_advanced_at = Some(record.observed_at);
        drop(state);
        record
    }

    /// Install `record` only if its id is strictly above the current frontier.
    ///
    /// Returns the installed record, or `None` when it would not move the
    /// frontier forward.
    pub async fn advance(&self, record: AccountRecord) -> Option<Arc<AccountRecord>> {
        let mut state = self.state.write().await;
        if state.record.as_ref().is_some_and(|cur| record.id <= cur.id) {
            return None;
        }
        let record = Arc::new(record);
        state.record = Some(Arc::clone(&record));
        state.last_advanced_at = Some(record.observed_at);
        drop(state);
        self.accounts_discovered.fetch_add(1, Ordering::Relaxed);
        Some(record)
    }

    pub async fn phase(&self) -> TrackerPhase {
        self.state.read().await.phase
    }

    pub async fn set_phase(&self, phase: TrackerPhase) {
        let mut state = self.state.write().await;
        if state.phase != phase {
            log::debug!("Tracker phase {:?} -> {phase:?}", state.phase);
            state.phase = phase;
        }
    }

    pub(crate) fn record_probe(&self) {
        self.probes_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent snapshot for the status surface.
    pub async fn status(&self) -> TrackerStatus {
        let state = self.state.read().await;
        TrackerStatus {
            phase: state.phase,
            searching: state.phase == TrackerPhase::Searching,
            current: state.record.as_deref().cloned(),
            probes_issued: self.probes_issued.load(Ordering::Relaxed),
            accounts_discovered: self.accounts_discovered.load(Ordering::Relaxed),
            last_advanced_at: state.last_advanced_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::record;

    #[tokio::test]
    async fn starts_empty_and_initializing() {
        let cell = FrontierCell::new();
        assert!(cell.current().await.is_none());
        let status = cell.status().await;
        assert!(status.is_initializing());
        assert_eq!(status.phase, TrackerPhase::Initializing);
        assert!(!status.searching);
    }

    #[tokio::test]
    async fn advance_requires_strictly_greater_id() {
        let cell = FrontierCell::new();
        assert!(cell.advance(record(10)).await.is_some());
        assert!(cell.advance(record(10)).await.is_none());
        assert!(cell.advance(record(9)).await.is_none());
        assert!(cell.advance(record(11)).await.is_some());
        assert_eq!(cell.current().await.map(|r| r.id), Some(11));
        assert_eq!(cell.status().await.accounts_discovered, 2);
    }

    #[tokio::test]
    async fn replace_may_lower_the_frontier() {
        let cell = FrontierCell::new();
        cell.replace(record(50)).await;
        cell.replace(record(40)).await;
        assert_eq!(cell.current().await.map(|r| r.id), Some(40));
        assert_eq!(cell.status().await.accounts_discovered, 0);
    }

    #[tokio::test]
    async fn replace_stamps_last_change() {
        let cell = FrontierCell::new();
        assert!(cell.status().await.last_advanced_at.is_none());
        let installed = cell.replace(record(7)).await;
        assert_eq!(
            cell.status().await.last_advanced_at,
            Some(installed.observed_at)
        );
    }

    #[tokio::test]
    async fn searching_flag_follows_phase() {
        let cell = FrontierCell::new();
        cell.set_phase(TrackerPhase::Searching).await;
        assert!(cell.status().await.searching);
        cell.set_phase(TrackerPhase::Tracking).await;
        assert!(!cell.status().await.searching);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_see_torn_records() {
        let cell = Arc::new(FrontierCell::new());
        cell.replace(record(1)).await;

        let writer = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move {
                for id in 2..=2_000 {
                    cell.advance(record(id)).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                tokio::spawn(async move {
                    let mut last_seen = 0;
                    for _ in 0..2_000 {
                        let current = cell.current().await.unwrap();
                        assert_eq!(current.username, format!("user-{}", current.id));
                        assert!(current.id >= last_seen, "frontier moved backwards");
                        last_seen = current.id;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(cell.current().await.map(|r| r.id), Some(2_000));
    }
}
