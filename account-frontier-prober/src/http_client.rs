//! Generic HTTP client tools
//!
//! One request in, one `(status, body)` pair out. Classification of the status
//! code is left to the caller so the same plumbing serves both the account
//! endpoint and the profile page.
//!
//! Requests are never retried here: retry policy belongs to the tracker.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::ProbeError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Timeouts and identification applied to every outbound request.
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Upper bound for a whole request, body included.
    pub request_timeout: Duration,
    /// Upper bound for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("account-frontier/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Create an HTTP client with the configured timeouts.
pub fn create_http_client(options: &HttpClientOptions) -> Result<Client, ProbeError> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.request_timeout)
        .user_agent(options.user_agent.clone())
        .build()
        .map_err(|e| ProbeError::InvalidRequest {
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code with the response text.
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - any status except 429
    /// * `Err(ProbeError::RateLimited)` - HTTP 429
    /// * `Err(ProbeError::Timeout)` / `Err(ProbeError::NetworkError)` - transport failure
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), ProbeError> {
        log::debug!("{method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ProbeError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("{url} -> HTTP {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            log::warn!("Rate limited (HTTP 429) on {url}, retry_after={retry_after:?}");
            return Err(ProbeError::RateLimited { retry_after });
        }

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout {
                    detail: format!("Timed out reading response body: {e}"),
                }
            } else {
                ProbeError::NetworkError {
                    detail: format!("Failed to read response body: {e}"),
                }
            }
        })?;

        log::trace!("Response Body: {}", truncate_for_log(&response_text));

        Ok((status_code, response_text))
    }

    /// Parse JSON response
    pub fn parse_json<T>(response_text: &str) -> Result<T, ProbeError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::warn!(
                "JSON parse failed: {e}; raw response: {}",
                truncate_for_log(response_text)
            );
            ProbeError::ParseError {
                detail: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_valid() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Foo {
            x: i32,
        }
        let result: Result<Foo, ProbeError> = HttpUtils::parse_json(r#"{"x":42}"#);
        assert!(
            matches!(&result, Ok(Foo { x: 42 })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_json_invalid() {
        let result: Result<serde_json::Value, ProbeError> = HttpUtils::parse_json("not json");
        assert!(
            matches!(&result, Err(ProbeError::ParseError { .. })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn default_options_are_bounded() {
        let options = HttpClientOptions::default();
        assert_eq!(options.request_timeout, Duration::from_secs(10));
        assert!(options.connect_timeout <= options.request_timeout);
        assert!(options.user_agent.starts_with("account-frontier/"));
    }

    #[test]
    fn client_builds_with_defaults() {
        assert!(create_http_client(&HttpClientOptions::default()).is_ok());
    }
}
