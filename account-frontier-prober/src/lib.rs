//! # account-frontier-prober
//!
//! Existence checks against a remote web service that hands out sequential
//! account identifiers.
//!
//! A probe answers one question for one identifier and always comes back with
//! one of three verdicts:
//!
//! | Verdict | Meaning | Remote signal |
//! |---------|---------|---------------|
//! | [`ProbeOutcome::Found`] | The account exists | HTTP 200 with a JSON object |
//! | [`ProbeOutcome::Absent`] | The id holds no account | HTTP 400 / 401 / 404 |
//! | [`ProbeOutcome::Indeterminate`] | No verdict | timeouts, connection errors, 429, 5xx, anything else |
//!
//! `Indeterminate` is never proof of absence. Callers decide whether and when
//! to ask again; the prober itself never retries.
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)* — Use rustls.
//! - **`native-tls`** — Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use account_frontier_prober::{
//!     AccountProber, HttpClientOptions, HttpProber, ProbeOutcome, RemoteEndpoints,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let prober = HttpProber::new(
//!         RemoteEndpoints {
//!             account_url: "https://users.example.com/v1/users/{id}".to_string(),
//!             profile_url: "https://www.example.com/users/{id}/profile".to_string(),
//!         },
//!         &HttpClientOptions::default(),
//!     )?;
//!
//!     match prober.probe(42).await {
//!         ProbeOutcome::Found(record) => println!("{} is {}", record.id, record.username),
//!         ProbeOutcome::Absent => println!("nobody at 42"),
//!         ProbeOutcome::Indeterminate(e) => println!("try again later: {e}"),
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod http_client;
mod remote;
mod traits;
mod types;
mod utils;

pub use error::{ProbeError, Result};
pub use http_client::{HttpClientOptions, create_http_client};
pub use remote::{HttpProber, ID_PLACEHOLDER, RemoteEndpoints, extract_profile};
pub use traits::AccountProber;
pub use types::{AccountRecord, ProbeOutcome, ProfileDetails, ProfileOutcome, UNKNOWN_USERNAME};
