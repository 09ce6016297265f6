//! Type definition module

mod settings;
mod status;

pub use settings::{IndeterminatePolicy, TrackerSettings};
pub use status::{BatchReport, TrackerPhase, TrackerStatus};

// Re-export public types of the prober library
pub use account_frontier_prober::{AccountRecord, ProbeOutcome, UNKNOWN_USERNAME};
