//! HTTP-backed prober for the remote account service

mod http;
mod profile;

use reqwest::Client;

use crate::error::{ProbeError, Result};
use crate::http_client::{HttpClientOptions, create_http_client};

pub use profile::extract_profile;

/// Placeholder substituted with the account id in URL templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// URL templates of the remote service. Both must contain [`ID_PLACEHOLDER`].
#[derive(Debug, Clone)]
pub struct RemoteEndpoints {
    /// JSON account resource, e.g. `https://users.example.com/v1/users/{id}`.
    pub account_url: String,
    /// HTML profile page, e.g. `https://www.example.com/users/{id}/profile`.
    pub profile_url: String,
}

impl RemoteEndpoints {
    fn validate(&self) -> Result<()> {
        for (name, template) in [
            ("account_url", &self.account_url),
            ("profile_url", &self.profile_url),
        ] {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(ProbeError::InvalidRequest {
                    detail: format!("{name} must contain the {ID_PLACEHOLDER} placeholder"),
                });
            }
        }
        Ok(())
    }
}

/// Prober talking to the real remote service over HTTP.
pub struct HttpProber {
    pub(crate) client: Client,
    pub(crate) endpoints: RemoteEndpoints,
}

impl HttpProber {
    pub fn new(endpoints: RemoteEndpoints, options: &HttpClientOptions) -> Result<Self> {
        endpoints.validate()?;
        Ok(Self {
            client: create_http_client(options)?,
            endpoints,
        })
    }

    pub(crate) fn account_url(&self, id: u64) -> String {
        self.endpoints
            .account_url
            .replace(ID_PLACEHOLDER, &id.to_string())
    }

    pub(crate) fn profile_url(&self, id: u64) -> String {
        self.endpoints
            .profile_url
            .replace(ID_PLACEHOLDER, &id.to_string())
    }
}
