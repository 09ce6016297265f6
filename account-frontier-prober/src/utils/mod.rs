//! Utility modules.

/// Keeps response bodies from flooding the logs.
pub(crate) mod log_sanitizer;
