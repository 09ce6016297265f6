//! Status surface types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use account_frontier_prober::AccountRecord;

/// Lifecycle phase of the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerPhase {
    /// Not started yet, or reconciling a cached record.
    #[default]
    Initializing,
    /// Bootstrap binary search in progress.
    Searching,
    /// A frontier is established and being polled forward.
    Tracking,
    /// The tracker loop has returned.
    Stopped,
}

/// Point-in-time view of the tracker for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub phase: TrackerPhase,
    /// Whether the bootstrap search is running right now.
    pub searching: bool,
    /// Highest account confirmed to exist, if any.
    pub current: Option<AccountRecord>,
    /// Probes issued since start.
    pub probes_issued: u64,
    /// Times forward polling advanced the frontier.
    pub accounts_discovered: u64,
    /// When the frontier record last changed, at startup or by polling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_advanced_at: Option<DateTime<Utc>>,
}

impl TrackerStatus {
    /// Whether consumers should be told the service is still warming up.
    pub fn is_initializing(&self) -> bool {
        self.current.is_none()
    }
}

/// Summary of one forward polling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// First id of the window.
    pub window_start: u64,
    /// Ids actually probed (less than the window when cancelled mid-batch).
    pub scanned: u64,
    pub found: u64,
    pub absent: u64,
    pub indeterminate: u64,
    /// New frontier id, when the batch advanced it.
    pub advanced_to: Option<u64>,
}
