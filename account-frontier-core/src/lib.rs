//! Account Frontier Core Library
//!
//! Finds and follows the highest allocated account id of a remote service:
//! - Bootstrap binary search when nothing trustworthy is cached
//! - Startup reconciliation of a persisted frontier
//! - Forward polling of a small window above the frontier
//!
//! The library is platform-independent. Storage and sleeping are abstracted
//! through traits so the tracker runs the same in the web server and in tests.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{FrontierCell, FrontierTracker, TrackerContext};
pub use traits::{InMemoryRecordStore, Pacer, RecordStore, TokioPacer};
pub use types::{BatchReport, IndeterminatePolicy, TrackerPhase, TrackerSettings, TrackerStatus};
