//! Request execution and status classification

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProbeError;
use crate::http_client::HttpUtils;
use crate::traits::AccountProber;
use crate::types::{AccountRecord, ProbeOutcome, ProfileOutcome};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{HttpProber, extract_profile};

/// Statuses the remote service uses for ids that do not (or may not) hold an account.
///
/// 400: malformed or out-of-range id
/// 401: deleted or hidden account
/// 404: never allocated
const ABSENT_STATUSES: &[u16] = &[400, 401, 404];

fn is_absent_status(status: u16) -> bool {
    ABSENT_STATUSES.contains(&status)
}

/// Map an account endpoint response to a probe verdict.
pub(crate) fn classify_account_response(probed_id: u64, status: u16, body: &str) -> ProbeOutcome {
    match status {
        200 => match HttpUtils::parse_json::<Value>(body) {
            Ok(payload @ Value::Object(_)) => {
                ProbeOutcome::Found(AccountRecord::from_payload(probed_id, payload))
            }
            Ok(other) => ProbeOutcome::Indeterminate(ProbeError::ParseError {
                detail: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
            Err(e) => ProbeOutcome::Indeterminate(e),
        },
        s if is_absent_status(s) => ProbeOutcome::Absent,
        s => ProbeOutcome::Indeterminate(ProbeError::UnexpectedStatus {
            status: s,
            body: truncate_for_log(body),
        }),
    }
}

/// Map a profile page response to a fetch verdict.
pub(crate) fn classify_profile_response(id: u64, status: u16, body: &str) -> ProfileOutcome {
    match status {
        200 => ProfileOutcome::Found(extract_profile(id, body)),
        s if is_absent_status(s) => ProfileOutcome::Absent,
        s => ProfileOutcome::Indeterminate(ProbeError::UnexpectedStatus {
            status: s,
            body: truncate_for_log(body),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl AccountProber for HttpProber {
    async fn probe(&self, id: u64) -> ProbeOutcome {
        let url = self.account_url(id);
        let request = self
            .client
            .get(&url)
            .header("Accept", "application/json");

        let outcome = match HttpUtils::execute_request(request, "GET", &url).await {
            Ok((status, body)) => classify_account_response(id, status, &body),
            Err(e) => ProbeOutcome::Indeterminate(e),
        };

        match outcome {
            ProbeOutcome::Found(record) if record.id != id => {
                log::warn!(
                    "Payload for account {id} declares id {}, keeping the probed id",
                    record.id
                );
                ProbeOutcome::Found(AccountRecord { id, ..record })
            }
            ProbeOutcome::Indeterminate(ref e) => {
                log::warn!("Probe for account {id} was inconclusive: {e}");
                outcome
            }
            other => other,
        }
    }
}

impl HttpProber {
    /// Fetch and scrape the public profile page of an account.
    ///
    /// Scraping is best-effort: a page that loads but matches none of the
    /// known tags yields a [`ProfileOutcome::Found`] with empty fields.
    pub async fn fetch_profile(&self, id: u64) -> ProfileOutcome {
        let url = self.profile_url(id);
        let request = self.client.get(&url).header("Accept", "text/html");

        match HttpUtils::execute_request(request, "GET", &url).await {
            Ok((status, body)) => classify_profile_response(id, status, &body),
            Err(e) => {
                log::warn!("Profile fetch for account {id} failed: {e}");
                ProfileOutcome::Indeterminate(e)
            }
        }
    }
}
