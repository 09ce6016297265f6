use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProbeError;

/// Display name used when the payload carries none.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Keys tried, in order, for the account identifier.
const ID_KEYS: &[&str] = &["Id", "id"];
/// Keys tried, in order, for the display name.
const USERNAME_KEYS: &[&str] = &["Username", "username", "Name", "name"];

// ============ Account ============

/// An account confirmed to exist on the remote service.
///
/// Records are immutable once built: the tracker replaces them wholesale and
/// never edits fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Sequential account identifier.
    pub id: u64,
    /// Display label resolved from the payload, or [`UNKNOWN_USERNAME`].
    pub username: String,
    /// Payload exactly as the remote service returned it.
    pub raw: Value,
    /// When a probe confirmed this record.
    pub observed_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Build a record from a success payload.
    ///
    /// The identifier comes from `Id`/`id` (number or numeric string) and falls
    /// back to `probed_id`. The display name comes from the first non-empty
    /// string among `Username`, `username`, `Name`, `name`.
    pub fn from_payload(probed_id: u64, raw: Value) -> Self {
        let id = declared_id(&raw).unwrap_or(probed_id);
        let username = declared_username(&raw).unwrap_or_else(|| UNKNOWN_USERNAME.to_string());
        Self {
            id,
            username,
            raw,
            observed_at: Utc::now(),
        }
    }
}

/// Identifier declared by the payload, if any.
pub(crate) fn declared_id(raw: &Value) -> Option<u64> {
    ID_KEYS.iter().find_map(|key| match raw.get(*key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn declared_username(raw: &Value) -> Option<String> {
    USERNAME_KEYS.iter().find_map(|key| {
        raw.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}

// ============ Probe ============

/// Verdict of a single existence check.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The account exists.
    Found(AccountRecord),
    /// The remote service authoritatively reported no account at this id.
    Absent,
    /// No verdict could be reached; the caller decides whether to retry.
    Indeterminate(ProbeError),
}

impl ProbeOutcome {
    /// Short label for logs and counters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Absent => "absent",
            Self::Indeterminate(_) => "indeterminate",
        }
    }
}

// ============ Profile ============

/// Best-effort attributes scraped from an account's public profile page.
///
/// Every field is optional: pages change layout without notice and a missing
/// attribute is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    /// Account identifier the page was fetched for.
    pub id: u64,
    /// Contents of the `<title>` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `og:title` meta tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `og:description` or `description` meta tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `og:image` meta tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Result of a profile fetch, mirroring [`ProbeOutcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    Found(ProfileDetails),
    Absent,
    Indeterminate(ProbeError),
}
