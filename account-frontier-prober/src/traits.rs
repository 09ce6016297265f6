use async_trait::async_trait;

use crate::types::ProbeOutcome;

/// Existence check for a single account identifier.
///
/// Implementations issue at most one bounded-time request per call and never
/// retry internally. Anything that is not an authoritative "does not exist"
/// answer must come back as [`ProbeOutcome::Indeterminate`].
#[async_trait]
pub trait AccountProber: Send + Sync {
    /// Probe the account at `id`.
    async fn probe(&self, id: u64) -> ProbeOutcome;
}
