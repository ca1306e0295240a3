//! Outbound Sync - Delivers page state to an external observer.
//!
//! # Pipeline
//!
//! ```text
//! page signal → effect → PagePublisher (watch slot) → channel task → Connection
//! ```
//!
//! The session side never waits on the network. The channel task reads the
//! newest page from the slot whenever it is ready to send.

pub mod backoff;
pub mod channel;
pub mod config;
pub mod message;
pub mod transport;

pub use backoff::Backoff;
pub use channel::{ConnectionState, PagePublisher, SyncHandle};
pub use config::{SyncConfig, DEFAULT_URL, URL_ENV};
pub use message::{OutboundMessage, UI_STATE_UPDATE};
pub use transport::{Connection, Connector, WebSocketConnection, WebSocketConnector};
