//! Bootstrap service
//!
//! Locates the frontier with a binary search when no trusted cached record
//! exists, then confirms the result before handing it to the tracker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use account_frontier_prober::{AccountRecord, ProbeOutcome};
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::types::{IndeterminatePolicy, TrackerPhase};

use super::TrackerContext;

/// Searches an id may abandon under `IndeterminatePolicy::Abandon` before
/// later searches step down past it.
const ABANDONS_BEFORE_STEP_DOWN: u32 = 2;

/// Existence verdict the search is allowed to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Exists,
    Missing,
}

/// Bootstrap service
pub struct BootstrapService {
    ctx: Arc<TrackerContext>,
    /// Abandoned searches per id, kept across bootstrap attempts
    abandoned: Mutex<HashMap<u64, u32>>,
}

impl BootstrapService {
    /// Create bootstrap service instance
    #[must_use]
    pub fn new(ctx: Arc<TrackerContext>) -> Self {
        Self {
            ctx,
            abandoned: Mutex::new(HashMap::new()),
        }
    }

    /// Count one more abandoned search at `id` and return the total.
    fn record_abandon(&self, id: u64) -> u32 {
        let mut abandoned = self.abandoned.lock().unwrap_or_else(PoisonError::into_inner);
        let count = abandoned.entry(id).or_insert(0);
        *count += 1;
        *count
    }

    /// Binary search for the highest existing id in `[low, high]`.
    ///
    /// Returns `low` when nothing in the range exists; the caller's confirming
    /// probe catches that case.
    pub async fn search(&self, low: u64, high: u64, cancel: &CancellationToken) -> CoreResult<u64> {
        if low == 0 || low > high {
            return Err(CoreError::InvalidRange { low, high });
        }

        log::info!("Searching for the frontier in [{low}, {high}]");

        let (mut lo, mut hi) = (low, high);
        let mut latest_found = low;
        let mut probes = 0_u32;

        while lo <= hi {
            if probes > 0 && !self.ctx.pause(self.ctx.settings.probe_delay, cancel).await {
                return Err(CoreError::Cancelled);
            }
            probes += 1;

            let mid = lo + (hi - lo) / 2;
            match self.resolve(mid, cancel).await? {
                Verdict::Exists => {
                    latest_found = mid;
                    match mid.checked_add(1) {
                        Some(next) => lo = next,
                        None => break,
                    }
                }
                // mid >= low >= 1, so this never underflows
                Verdict::Missing => hi = mid - 1,
            }
            log::trace!("search window now [{lo}, {hi}], best {latest_found}");
        }

        log::info!("Search converged on {latest_found} after {probes} probes");
        Ok(latest_found)
    }

    /// Probe `id` until it yields a verdict or the retry budget runs out.
    async fn resolve(&self, id: u64, cancel: &CancellationToken) -> CoreResult<Verdict> {
        let settings = &self.ctx.settings;
        let mut attempt = 0_u32;

        loop {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }

            match self.ctx.probe(id).await {
                ProbeOutcome::Found(_) => return Ok(Verdict::Exists),
                ProbeOutcome::Absent => return Ok(Verdict::Missing),
                ProbeOutcome::Indeterminate(e) if attempt < settings.indeterminate_retries => {
                    attempt += 1;
                    log::warn!(
                        "Account {id} indeterminate during search (attempt {attempt}/{}): {e}",
                        settings.indeterminate_retries
                    );
                    if !self
                        .ctx
                        .pause(settings.indeterminate_retry_delay, cancel)
                        .await
                    {
                        return Err(CoreError::Cancelled);
                    }
                }
                ProbeOutcome::Indeterminate(e) => {
                    return match settings.indeterminate_policy {
                        IndeterminatePolicy::Abandon => {
                            let abandons = self.record_abandon(id);
                            if abandons >= ABANDONS_BEFORE_STEP_DOWN {
                                log::warn!(
                                    "Account {id} inconclusive in {abandons} searches, treating as absent: {e}"
                                );
                                Ok(Verdict::Missing)
                            } else {
                                log::warn!("Account {id} still indeterminate, abandoning search: {e}");
                                Err(CoreError::SearchInconclusive { id })
                            }
                        }
                        IndeterminatePolicy::TreatAsAbsent => {
                            log::warn!("Account {id} still indeterminate, treating as absent: {e}");
                            Ok(Verdict::Missing)
                        }
                    };
                }
            }
        }
    }

    /// Search and confirm until a frontier is established.
    ///
    /// Never gives up on its own: a failed or inconclusive attempt is retried
    /// after the configured cooldown. Only cancellation ends the loop early.
    pub async fn establish(&self, cancel: &CancellationToken) -> CoreResult<Arc<AccountRecord>> {
        let settings = &self.ctx.settings;
        let mut attempt = 0_u32;

        loop {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            attempt += 1;
            self.ctx.cell.set_phase(TrackerPhase::Searching).await;

            match self
                .search(settings.search_low, settings.search_high, cancel)
                .await
            {
                Ok(id) => {
                    if !self.ctx.pause(settings.probe_delay, cancel).await {
                        return Err(CoreError::Cancelled);
                    }
                    match self.ctx.probe(id).await {
                        ProbeOutcome::Found(record) => {
                            self.abandoned
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .clear();
                            let record = self.ctx.cell.replace(record).await;
                            self.ctx.persist(&record).await;
                            self.ctx.cell.set_phase(TrackerPhase::Tracking).await;
                            log::info!(
                                "Frontier established at {} ({}) after {attempt} attempt(s)",
                                record.id,
                                record.username
                            );
                            return Ok(record);
                        }
                        other => log::warn!(
                            "Confirmation probe for {id} came back {}, retrying bootstrap",
                            other.label()
                        ),
                    }
                }
                Err(CoreError::Cancelled) => return Err(CoreError::Cancelled),
                Err(e) if e.is_expected() => log::warn!("Bootstrap attempt {attempt} failed: {e}"),
                Err(e) => {
                    log::error!("Bootstrap attempt {attempt} failed: {e}");
                    if matches!(e, CoreError::InvalidRange { .. }) {
                        return Err(e);
                    }
                }
            }

            log::info!(
                "Retrying bootstrap in {:.1}s",
                settings.bootstrap_cooldown.as_secs_f32()
            );
            if !self.ctx.pause(settings.bootstrap_cooldown, cancel).await {
                return Err(CoreError::Cancelled);
            }
        }
    }
}
