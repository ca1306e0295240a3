//! Sync Config - Where and how often page state is shipped.
//!
//! Loaded from TOML with every key optional:
//!
//! ```toml
//! url = "ws://localhost:4000/ui-reflection"
//! snapshot_interval_ms = 5000
//! reconnect_base_ms = 1000
//! reconnect_max_ms = 5000
//! max_reconnect_attempts = 5
//! ```
//!
//! The URL can be overridden with `UI_REFLECTION_URL`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::backoff::Backoff;
use crate::error::ConfigError;

/// Environment variable that overrides [`SyncConfig::url`].
pub const URL_ENV: &str = "UI_REFLECTION_URL";

pub const DEFAULT_URL: &str = "ws://localhost:4000/ui-reflection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// When false, the channel never connects.
    pub enabled: bool,
    pub url: String,
    /// Full snapshot resend period while connected.
    pub snapshot_interval_ms: u64,
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
    /// Consecutive failed reconnects before giving up for good.
    pub max_reconnect_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_URL.to_string(),
            snapshot_interval_ms: 5_000,
            reconnect_base_ms: 1_000,
            reconnect_max_ms: 5_000,
            max_reconnect_attempts: 5,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if self.snapshot_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming("snapshot_interval_ms must be positive"));
        }
        if self.reconnect_base_ms == 0 {
            return Err(ConfigError::InvalidTiming("reconnect_base_ms must be positive"));
        }
        if self.reconnect_base_ms > self.reconnect_max_ms {
            return Err(ConfigError::InvalidTiming("reconnect_base_ms exceeds reconnect_max_ms"));
        }
        Ok(())
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.reconnect_base_ms),
            Duration::from_millis(self.reconnect_max_ms),
            self.max_reconnect_attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.snapshot_interval(), Duration::from_secs(5));
        assert_eq!(config.max_reconnect_attempts, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str("snapshot_interval_ms = 250\n").unwrap();
        assert_eq!(config.snapshot_interval_ms, 250);
        assert_eq!(config.url, DEFAULT_URL);
        assert!(config.enabled);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SyncConfig::from_toml_str("retries = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = SyncConfig::from_toml_str("url = \"not a url\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = SyncConfig::from_toml_str("url = \"http://localhost:4000\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(scheme) if scheme == "http"));
    }

    #[test]
    fn test_timing_validation() {
        let config = SyncConfig {
            reconnect_base_ms: 10_000,
            reconnect_max_ms: 1_000,
            ..SyncConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming(_))));

        let config = SyncConfig {
            snapshot_interval_ms: 0,
            ..SyncConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming(_))));
    }

    #[test]
    fn test_url_override() {
        let config = SyncConfig::default().with_overrides(|key| {
            (key == URL_ENV).then(|| "ws://127.0.0.1:9999/state".to_string())
        });
        assert_eq!(config.url, "ws://127.0.0.1:9999/state");

        let config = SyncConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.url, DEFAULT_URL);
    }
}
