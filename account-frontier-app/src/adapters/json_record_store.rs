//! Frontier record store
//!
//! Keeps the last confirmed frontier record in a single JSON file.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous record intact.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use account_frontier_core::error::{CoreError, CoreResult};
use account_frontier_core::traits::RecordStore;
use account_frontier_core::types::AccountRecord;

/// Largest state file accepted on load.
pub const MAX_STATE_FILE_BYTES: u64 = 1024 * 1024;

/// JSON file based record store
pub struct JsonFileRecordStore {
    path: PathBuf,
    /// Serializes writers sharing this store
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Make sure the parent directory exists
    async fn ensure_parent_dir(&self) -> CoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| {
                CoreError::StorageError(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn load(&self) -> CoreResult<Option<AccountRecord>> {
        let metadata = match fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::StorageError(format!(
                    "Failed to stat {}: {e}",
                    self.path.display()
                )))
            }
        };

        if metadata.len() > MAX_STATE_FILE_BYTES {
            return Err(CoreError::StorageError(format!(
                "{} is {} bytes, refusing to load more than {MAX_STATE_FILE_BYTES}",
                self.path.display(),
                metadata.len()
            )));
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::StorageError(e.to_string()))?;

        let record: AccountRecord = serde_json::from_str(&content)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        log::debug!("Loaded frontier {} from {}", record.id, self.path.display());
        Ok(Some(record))
    }

    async fn save(&self, record: &AccountRecord) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        self.ensure_parent_dir().await?;

        let temp = self.temp_path();
        fs::write(&temp, content)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to write {}: {e}", temp.display())))?;
        fs::rename(&temp, &self.path).await.map_err(|e| {
            CoreError::StorageError(format!(
                "Failed to move {} into place: {e}",
                self.path.display()
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_sits_next_to_target() {
        let store = JsonFileRecordStore::new("data/latest_account.json");
        assert_eq!(store.temp_path(), PathBuf::from("data/latest_account.json.tmp"));
    }
}
