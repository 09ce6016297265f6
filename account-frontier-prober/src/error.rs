use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a probe could not reach a verdict.
///
/// Every variant is a transient or unexpected condition. None of them proves
/// that an account is absent: callers must treat them as "try again later".
/// Authoritative absence is reported through
/// [`ProbeOutcome::Absent`](crate::ProbeOutcome::Absent), never through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code")]
pub enum ProbeError {
    /// The request did not complete within the configured timeout.
    #[error("Request timeout: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// Connection refused, DNS failure, reset while reading the body, etc.
    #[error("Network error: {detail}")]
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The remote service answered HTTP 429.
    #[error("Rate limited{}", .retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Suggested wait time in seconds, if the service sent `Retry-After`.
        retry_after: Option<u64>,
    },

    /// A status code outside the known vocabulary of the remote service.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// A success response whose body could not be understood.
    #[error("Parse error: {detail}")]
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// The request could not be built (bad URL template, id out of range).
    #[error("Invalid request: {detail}")]
    InvalidRequest {
        /// Description of what's wrong.
        detail: String,
    },
}

impl ProbeError {
    /// Whether retrying the same request later has a reasonable chance to succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } | Self::RateLimited { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            Self::ParseError { .. } | Self::InvalidRequest { .. } => false,
        }
    }
}

/// Convenience type alias for `Result<T, ProbeError>`.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let e = ProbeError::Timeout {
            detail: "10s elapsed".to_string(),
        };
        assert_eq!(e.to_string(), "Request timeout: 10s elapsed");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProbeError::RateLimited {
            retry_after: Some(30),
        };
        assert_eq!(e.to_string(), "Rate limited (retry after 30s)");
    }

    #[test]
    fn display_rate_limited_without_retry() {
        let e = ProbeError::RateLimited { retry_after: None };
        assert_eq!(e.to_string(), "Rate limited");
    }

    #[test]
    fn display_unexpected_status() {
        let e = ProbeError::UnexpectedStatus {
            status: 418,
            body: "teapot".to_string(),
        };
        assert_eq!(e.to_string(), "Unexpected HTTP status 418");
    }

    #[test]
    fn transient_classification() {
        assert!(ProbeError::Timeout { detail: String::new() }.is_transient());
        assert!(ProbeError::NetworkError { detail: String::new() }.is_transient());
        assert!(ProbeError::RateLimited { retry_after: None }.is_transient());
        assert!(
            ProbeError::UnexpectedStatus {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !ProbeError::UnexpectedStatus {
                status: 418,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!ProbeError::ParseError { detail: String::new() }.is_transient());
    }

    #[test]
    fn serializes_with_code_tag() {
        let e = ProbeError::RateLimited {
            retry_after: Some(5),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "RateLimited");
        assert_eq!(json["retry_after"], 5);
    }
}
