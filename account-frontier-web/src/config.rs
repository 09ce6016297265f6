//! Server configuration
//!
//! Read from a TOML file whose path comes from `ACCOUNT_FRONTIER_CONFIG`
//! (default `config.toml`). Every key is optional; a missing file means all
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use account_frontier_core::types::{IndeterminatePolicy, TrackerSettings};
use account_frontier_prober::{HttpClientOptions, ID_PLACEHOLDER, RemoteEndpoints};

pub const CONFIG_ENV: &str = "ACCOUNT_FRONTIER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub tracker: TrackerConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Account resource, `{id}` is replaced with the probed id
    pub account_url: String,
    /// Public profile page, `{id}` is replaced with the account id
    pub profile_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let http = HttpClientOptions::default();
        Self {
            account_url: "https://users.example.com/v1/users/{id}".to_string(),
            profile_url: "https://www.example.com/users/{id}/profile".to_string(),
            request_timeout_ms: duration_ms(http.request_timeout),
            connect_timeout_ms: duration_ms(http.connect_timeout),
            user_agent: http.user_agent,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub search_low: u64,
    pub search_high: u64,
    pub window_size: u64,
    pub probe_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub bootstrap_cooldown_ms: u64,
    pub indeterminate_retries: u32,
    pub indeterminate_retry_delay_ms: u64,
    pub indeterminate_policy: IndeterminatePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let settings = TrackerSettings::default();
        Self {
            search_low: settings.search_low,
            search_high: settings.search_high,
            window_size: settings.window_size,
            probe_delay_ms: duration_ms(settings.probe_delay),
            poll_interval_ms: duration_ms(settings.poll_interval),
            bootstrap_cooldown_ms: duration_ms(settings.bootstrap_cooldown),
            indeterminate_retries: settings.indeterminate_retries,
            indeterminate_retry_delay_ms: duration_ms(settings.indeterminate_retry_delay),
            indeterminate_policy: settings.indeterminate_policy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Where the last confirmed frontier is kept; empty disables persistence
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("data/latest_account.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Empty: stdout only. Otherwise a daily rolling file in this directory.
    pub directory: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            directory: String::new(),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl AppConfig {
    /// Load from the path in `ACCOUNT_FRONTIER_CONFIG`, or `config.toml`.
    ///
    /// Returns the config and whether a file was actually read.
    pub fn load() -> anyhow::Result<(Self, bool)> {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<(Self, bool)> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::default(), false));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let config = Self::parse(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok((config, true))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.tracker_settings()
            .validate()
            .map_err(|e| anyhow::anyhow!("[tracker] {e}"))?;
        for (key, template) in [
            ("account_url", &self.remote.account_url),
            ("profile_url", &self.remote.profile_url),
        ] {
            if !template.contains(ID_PLACEHOLDER) {
                bail!("[remote] {key} must contain {ID_PLACEHOLDER}");
            }
        }
        Ok(())
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        let t = &self.tracker;
        TrackerSettings {
            search_low: t.search_low,
            search_high: t.search_high,
            window_size: t.window_size,
            probe_delay: Duration::from_millis(t.probe_delay_ms),
            poll_interval: Duration::from_millis(t.poll_interval_ms),
            bootstrap_cooldown: Duration::from_millis(t.bootstrap_cooldown_ms),
            indeterminate_retries: t.indeterminate_retries,
            indeterminate_retry_delay: Duration::from_millis(t.indeterminate_retry_delay_ms),
            indeterminate_policy: t.indeterminate_policy,
        }
    }

    pub fn endpoints(&self) -> RemoteEndpoints {
        RemoteEndpoints {
            account_url: self.remote.account_url.clone(),
            profile_url: self.remote.profile_url.clone(),
        }
    }

    pub fn http_options(&self) -> HttpClientOptions {
        HttpClientOptions {
            request_timeout: Duration::from_millis(self.remote.request_timeout_ms),
            connect_timeout: Duration::from_millis(self.remote.connect_timeout_ms),
            user_agent: self.remote.user_agent.clone(),
        }
    }

    /// `None` when persistence is disabled.
    pub fn state_file(&self) -> Option<&Path> {
        let path = self.storage.state_file.as_path();
        (!path.as_os_str().is_empty()).then_some(path)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tracker_settings(), TrackerSettings::default());
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(
            config.state_file(),
            Some(Path::new("data/latest_account.json"))
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::parse(
            r#"
            [server]
            port = 9090

            [tracker]
            search_high = 1000
            window_size = 25
            probe_delay_ms = 0
            indeterminate_policy = "treat_as_absent"

            [storage]
            state_file = ""

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        let settings = config.tracker_settings();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(settings.search_high, 1000);
        assert_eq!(settings.window_size, 25);
        assert_eq!(settings.probe_delay, Duration::ZERO);
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(
            settings.indeterminate_policy,
            IndeterminatePolicy::TreatAsAbsent
        );
        assert!(config.state_file().is_none());
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn remote_timeouts_convert_to_durations() {
        let config = AppConfig::parse(
            r#"
            [remote]
            request_timeout_ms = 2500
            connect_timeout_ms = 750
            user_agent = "probe/1.0"
            "#,
        )
        .unwrap();
        let options = config.http_options();
        assert_eq!(options.request_timeout, Duration::from_millis(2500));
        assert_eq!(options.connect_timeout, Duration::from_millis(750));
        assert_eq!(options.user_agent, "probe/1.0");
    }

    #[test]
    fn invalid_range_is_rejected() {
        let err = AppConfig::parse("[tracker]\nsearch_low = 0\n").unwrap_err();
        assert!(err.to_string().contains("[tracker]"), "{err}");
        assert!(AppConfig::parse("[tracker]\nsearch_low = 10\nsearch_high = 5\n").is_err());
        assert!(AppConfig::parse("[tracker]\nwindow_size = 0\n").is_err());
    }

    #[test]
    fn url_without_placeholder_is_rejected() {
        let err = AppConfig::parse("[remote]\naccount_url = \"https://x.test/users\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("account_url"), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::parse("[tracker]\nwindow = 3\n").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, found) = AppConfig::load_from(&tmp.path().join("absent.toml")).unwrap();
        assert!(!found);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn file_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 1234\n").unwrap();
        let (config, found) = AppConfig::load_from(&path).unwrap();
        assert!(found);
        assert_eq!(config.server.port, 1234);
    }
}
