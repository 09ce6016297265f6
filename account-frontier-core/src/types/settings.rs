//! Tracker tuning knobs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// What the bootstrap search does with an id that stays indeterminate after
/// every retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminatePolicy {
    /// Give up on this search attempt; the tracker cools down and searches again.
    #[default]
    Abandon,
    /// Step downward as if the id were absent. May converge below the true frontier.
    TreatAsAbsent,
}

/// Timing and range parameters of the frontier tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Lowest id of the bootstrap search range (inclusive, >= 1).
    pub search_low: u64,
    /// Highest id of the bootstrap search range (inclusive).
    pub search_high: u64,
    /// Number of ids above the frontier scanned per polling batch.
    pub window_size: u64,
    /// Pause between two consecutive probes.
    pub probe_delay: Duration,
    /// Pause between two polling batches.
    pub poll_interval: Duration,
    /// Pause before a failed bootstrap is attempted again.
    pub bootstrap_cooldown: Duration,
    /// Extra attempts at an indeterminate id during the bootstrap search.
    pub indeterminate_retries: u32,
    /// Pause between those extra attempts.
    pub indeterminate_retry_delay: Duration,
    pub indeterminate_policy: IndeterminatePolicy,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            search_low: 1,
            search_high: 5_000_000,
            window_size: 10,
            probe_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(1000),
            bootstrap_cooldown: Duration::from_secs(5),
            indeterminate_retries: 3,
            indeterminate_retry_delay: Duration::from_millis(500),
            indeterminate_policy: IndeterminatePolicy::Abandon,
        }
    }
}

impl TrackerSettings {
    /// Reject settings the tracker cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.search_low == 0 || self.search_low > self.search_high {
            return Err(CoreError::InvalidRange {
                low: self.search_low,
                high: self.search_high,
            });
        }
        if self.window_size == 0 {
            return Err(CoreError::InvalidSettings(
                "window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
