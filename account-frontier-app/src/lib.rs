//! Platform-agnostic application bootstrap for the account frontier tracker.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection). Frontends build the state once at startup, spawn
//! [`AppState::run_tracker`] and hand the state to their request handlers.

pub mod adapters;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use account_frontier_core::error::{CoreError, CoreResult};
use account_frontier_core::services::{FrontierTracker, TrackerContext};
use account_frontier_core::traits::{InMemoryRecordStore, Pacer, RecordStore, TokioPacer};
use account_frontier_core::types::{TrackerSettings, TrackerStatus};
use account_frontier_prober::{AccountProber, HttpClientOptions, HttpProber, RemoteEndpoints};

use adapters::JsonFileRecordStore;

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Frontier tracker (sole writer of the frontier)
    pub tracker: Arc<FrontierTracker>,
    /// HTTP prober, also used for profile lookups
    pub prober: Arc<HttpProber>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Status snapshot for the HTTP surface.
    pub async fn status(&self) -> TrackerStatus {
        self.tracker.status().await
    }

    /// Drive the tracker until `cancel` fires. Flushes the frontier on return.
    pub async fn run_tracker(&self, cancel: CancellationToken) -> CoreResult<()> {
        self.tracker.run(cancel).await
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required
/// - `prober` or `endpoints` — how the remote service is reached
///
/// # Optional
/// - `account_prober` — existence checks; defaults to the HTTP prober
/// - `record_store` — defaults to `JsonFileRecordStore` at `state_file`, or
///   `InMemoryRecordStore` when no state file is configured
/// - `pacer` — defaults to `TokioPacer`
/// - `settings` — defaults to `TrackerSettings::default()`
#[derive(Default)]
pub struct AppStateBuilder {
    prober: Option<Arc<HttpProber>>,
    endpoints: Option<RemoteEndpoints>,
    http_options: HttpClientOptions,
    account_prober: Option<Arc<dyn AccountProber>>,
    record_store: Option<Arc<dyn RecordStore>>,
    state_file: Option<PathBuf>,
    pacer: Option<Arc<dyn Pacer>>,
    settings: TrackerSettings,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prober(mut self, prober: Arc<HttpProber>) -> Self {
        self.prober = Some(prober);
        self
    }

    #[must_use]
    pub fn endpoints(mut self, endpoints: RemoteEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    #[must_use]
    pub fn http_options(mut self, options: HttpClientOptions) -> Self {
        self.http_options = options;
        self
    }

    #[must_use]
    pub fn account_prober(mut self, prober: Arc<dyn AccountProber>) -> Self {
        self.account_prober = Some(prober);
        self
    }

    #[must_use]
    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    #[must_use]
    pub fn state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: TrackerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidSettings` if neither a prober nor endpoints
    /// were given, `CoreError::InvalidRange` for an unusable search range and
    /// `CoreError::Prober` if the HTTP client cannot be created.
    pub fn build(self) -> CoreResult<AppState> {
        self.settings.validate()?;

        let prober = match (self.prober, self.endpoints) {
            (Some(prober), _) => prober,
            (None, Some(endpoints)) => Arc::new(HttpProber::new(endpoints, &self.http_options)?),
            (None, None) => {
                return Err(CoreError::InvalidSettings(
                    "prober or endpoints are required".to_string(),
                ))
            }
        };

        let account_prober = self
            .account_prober
            .unwrap_or_else(|| Arc::clone(&prober) as Arc<dyn AccountProber>);

        let record_store = match (self.record_store, self.state_file) {
            (Some(store), _) => store,
            (None, Some(path)) => {
                log::info!("Persisting frontier to {}", path.display());
                Arc::new(JsonFileRecordStore::new(path)) as Arc<dyn RecordStore>
            }
            (None, None) => {
                log::warn!("No state file configured, the frontier will not survive restarts");
                Arc::new(InMemoryRecordStore::new())
            }
        };

        let pacer = self.pacer.unwrap_or_else(|| Arc::new(TokioPacer));

        let ctx = Arc::new(TrackerContext::new(
            account_prober,
            record_store,
            pacer,
            self.settings,
        ));

        Ok(AppState {
            tracker: Arc::new(FrontierTracker::new(ctx)),
            prober,
            started_at: Utc::now(),
        })
    }
}
