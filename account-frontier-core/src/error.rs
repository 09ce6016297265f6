//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use account_frontier_prober::ProbeError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Durable store could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Persisted data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Search range is empty or starts at zero
    #[error("Invalid search range: [{low}, {high}]")]
    InvalidRange { low: u64, high: u64 },

    /// Tracker settings that cannot be run with
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Bootstrap search hit an id that stayed indeterminate after every retry
    #[error("Search inconclusive: account {id} could not be probed")]
    SearchInconclusive { id: u64 },

    /// Cancellation was requested while the operation was in progress
    #[error("Operation cancelled")]
    Cancelled,

    /// Prober error (converting from library)
    #[error("{0}")]
    Prober(#[from] ProbeError),
}

impl CoreError {
    /// Whether it is expected behavior (remote flakiness, shutdown), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::SearchInconclusive { .. } | Self::Cancelled => true,
            Self::Prober(e) => e.is_transient(),
            Self::StorageError(_)
            | Self::SerializationError(_)
            | Self::InvalidRange { .. }
            | Self::InvalidSettings(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
