//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use account_frontier_prober::{AccountProber, AccountRecord, ProbeError, ProbeOutcome};

use crate::error::{CoreError, CoreResult};
use crate::services::TrackerContext;
use crate::traits::{Pacer, RecordStore};
use crate::types::TrackerSettings;

/// Record with a username derived from the id.
pub fn record(id: u64) -> AccountRecord {
    AccountRecord::from_payload(id, json!({ "id": id, "username": format!("user-{id}") }))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ===== SimulatedProber =====

#[derive(Default)]
struct SimulatedRemote {
    existing: BTreeSet<u64>,
    /// Remaining forced failures per id.
    failures: HashMap<u64, u32>,
    /// Specific (1-based) probe numbers per id that fail.
    failing_calls: HashMap<u64, Vec<u32>>,
    calls: HashMap<u64, u32>,
    log: Vec<u64>,
}

/// Remote service simulated with a set of existing ids.
#[derive(Clone, Default)]
pub struct SimulatedProber {
    remote: Arc<Mutex<SimulatedRemote>>,
}

impl SimulatedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(ids: RangeInclusive<u64>) -> Self {
        let prober = Self::new();
        lock(&prober.remote).existing.extend(ids);
        prober
    }

    pub fn add(&self, id: u64) {
        lock(&self.remote).existing.insert(id);
    }

    /// The next `times` probes of `id` come back indeterminate.
    pub fn fail_times(&self, id: u64, times: u32) {
        lock(&self.remote).failures.insert(id, times);
    }

    /// The `nth` probe of `id` (counting from 1) comes back indeterminate.
    pub fn fail_nth(&self, id: u64, nth: u32) {
        lock(&self.remote)
            .failing_calls
            .entry(id)
            .or_default()
            .push(nth);
    }

    pub fn probe_count(&self) -> usize {
        lock(&self.remote).log.len()
    }

    pub fn probes_of(&self, id: u64) -> u32 {
        lock(&self.remote).calls.get(&id).copied().unwrap_or(0)
    }

    pub fn probe_log(&self) -> Vec<u64> {
        lock(&self.remote).log.clone()
    }
}

#[async_trait]
impl AccountProber for SimulatedProber {
    async fn probe(&self, id: u64) -> ProbeOutcome {
        let mut remote = lock(&self.remote);
        remote.log.push(id);
        let call = {
            let calls = remote.calls.entry(id).or_insert(0);
            *calls += 1;
            *calls
        };

        let scripted = remote
            .failing_calls
            .get(&id)
            .is_some_and(|calls| calls.contains(&call));
        let forced = match remote.failures.get_mut(&id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if scripted || forced {
            return ProbeOutcome::Indeterminate(ProbeError::Timeout {
                detail: format!("simulated timeout for {id}"),
            });
        }

        if remote.existing.contains(&id) {
            ProbeOutcome::Found(record(id))
        } else {
            ProbeOutcome::Absent
        }
    }
}

// ===== MockRecordStore =====

pub struct MockRecordStore {
    stored: RwLock<Option<AccountRecord>>,
    saved: RwLock<Vec<AccountRecord>>,
    /// If Some, save returns this error
    save_error: RwLock<Option<String>>,
    /// If Some, load returns this error
    load_error: RwLock<Option<String>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            stored: RwLock::new(None),
            saved: RwLock::new(Vec::new()),
            save_error: RwLock::new(None),
            load_error: RwLock::new(None),
        }
    }

    pub fn with_record(record: AccountRecord) -> Self {
        Self {
            stored: RwLock::new(Some(record)),
            ..Self::new()
        }
    }

    pub async fn set_save_error(&self, err: Option<String>) {
        *self.save_error.write().await = err;
    }

    pub async fn set_load_error(&self, err: Option<String>) {
        *self.load_error.write().await = err;
    }

    /// Ids passed to successful `save` calls, oldest first.
    pub async fn saved_ids(&self) -> Vec<u64> {
        self.saved.read().await.iter().map(|r| r.id).collect()
    }

    pub async fn stored(&self) -> Option<AccountRecord> {
        self.stored.read().await.clone()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn load(&self) -> CoreResult<Option<AccountRecord>> {
        if let Some(ref msg) = *self.load_error.read().await {
            return Err(CoreError::SerializationError(msg.clone()));
        }
        Ok(self.stored.read().await.clone())
    }

    async fn save(&self, record: &AccountRecord) -> CoreResult<()> {
        if let Some(ref msg) = *self.save_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        *self.stored.write().await = Some(record.clone());
        self.saved.write().await.push(record.clone());
        Ok(())
    }
}

// ===== RecordingPacer =====

/// Pacer that returns immediately and remembers every requested pause.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
    cancel_after: Mutex<Option<(CancellationToken, usize)>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `token` once `count` pauses have been requested.
    pub fn cancel_after_pauses(&self, token: &CancellationToken, count: usize) {
        *lock(&self.cancel_after) = Some((token.clone(), count));
    }

    pub fn pauses(&self) -> Vec<Duration> {
        lock(&self.pauses).clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        let count = {
            let mut pauses = lock(&self.pauses);
            pauses.push(duration);
            pauses.len()
        };
        if let Some((token, limit)) = lock(&self.cancel_after).as_ref() {
            if count >= *limit {
                token.cancel();
            }
        }
        tokio::task::yield_now().await;
        !cancel.is_cancelled()
    }
}

// ===== Factory =====

/// Context over a fresh empty store and a recording pacer.
pub fn create_test_context(
    prober: SimulatedProber,
    settings: TrackerSettings,
) -> (Arc<TrackerContext>, Arc<MockRecordStore>, Arc<RecordingPacer>) {
    create_test_context_with_store(prober, Arc::new(MockRecordStore::new()), settings)
}

pub fn create_test_context_with_store(
    prober: SimulatedProber,
    store: Arc<MockRecordStore>,
    settings: TrackerSettings,
) -> (Arc<TrackerContext>, Arc<MockRecordStore>, Arc<RecordingPacer>) {
    let pacer = Arc::new(RecordingPacer::new());
    let ctx = Arc::new(TrackerContext::new(
        Arc::new(prober),
        Arc::clone(&store) as Arc<dyn RecordStore>,
        Arc::clone(&pacer) as Arc<dyn Pacer>,
        settings,
    ));
    (ctx, store, pacer)
}
