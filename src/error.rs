//! Error types.
//!
//! Registry and session operations never fail; they recover locally and log.
//! Errors only come out of configuration loading and the outbound channel.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Problems with a [`crate::sync::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse sync config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid sync url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("sync url must use ws or wss, got `{0}`")]
    UnsupportedScheme(String),

    #[error("invalid sync timing: {0}")]
    InvalidTiming(&'static str),
}

/// Failures on the outbound sync channel.
///
/// None of these reach registration callers; the channel logs them and
/// follows its reconnect policy.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("failed to send ui state")]
    Send(#[source] tungstenite::Error),

    #[error("failed to read from peer")]
    Receive(#[source] tungstenite::Error),

    #[error("failed to encode ui state")]
    Encode(#[from] serde_json::Error),

    #[error("connection closed by peer")]
    Closed,
}
