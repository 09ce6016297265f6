//! Durable single-slot storage of the current frontier record

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use account_frontier_prober::AccountRecord;

use crate::error::CoreResult;

/// Record Store Trait
///
/// Holds at most one record: the last frontier the tracker confirmed.
///
/// Platform implementation:
/// - `JsonFileRecordStore` (account-frontier-app): one JSON file on disk
/// - [`InMemoryRecordStore`]: process lifetime only
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the persisted record.
    ///
    /// Returns `Ok(None)` when nothing was ever saved (first run).
    async fn load(&self) -> CoreResult<Option<AccountRecord>>;

    /// Replace the persisted record.
    ///
    /// # Arguments
    /// * `record` - New frontier record
    async fn save(&self, record: &AccountRecord) -> CoreResult<()>;
}

/// In-memory record store
///
/// Default implementation, available on all platforms. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    slot: Arc<RwLock<Option<AccountRecord>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `record`
    #[must_use]
    pub fn with_record(record: AccountRecord) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(record))),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load(&self) -> CoreResult<Option<AccountRecord>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, record: &AccountRecord) -> CoreResult<()> {
        *self.slot.write().await = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn empty_store_loads_none() {
        let store = InMemoryRecordStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let store = InMemoryRecordStore::with_record(AccountRecord::from_payload(
            1,
            json!({"username": "first"}),
        ));
        let second = AccountRecord::from_payload(2, json!({"username": "second"}));
        store.save(&second).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn clones_share_the_slot() {
        let store = InMemoryRecordStore::new();
        let clone = store.clone();
        let record = AccountRecord::from_payload(3, json!({}));
        clone.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap().map(|r| r.id), Some(3));
    }
}
