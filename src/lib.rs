//! # ui-reflection
//!
//! Live component tree of a UI page, for automated test drivers and agents.
//!
//! UI components register themselves when they mount, patch their record
//! when their state changes and unregister when they unmount. The library
//! keeps the flat registry, rebuilds an ordered tree after every change,
//! publishes it through a [spark-signals](https://crates.io/crates/spark-signals)
//! signal and ships it to an external listener over a WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! register/update/unregister → Registry → build_tree → Signal<PageState> → effect → SyncHandle → WebSocket
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Component kinds, drafts, patches, page metadata
//! - [`engine`] - Registry, ordinals, tree builder, page state
//! - [`session`] - Page session, parent scopes, registration handles
//! - [`sync`] - Outbound channel: config, backoff, wire format, transport
//! - [`error`] - Config and sync errors

pub mod engine;
pub mod error;
pub mod session;
pub mod sync;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{build_tree, ComponentNode, ComponentRecord, PageState, Registered, Registry, Sequence};

pub use error::{ConfigError, SyncError};

pub use session::{automation_attr, Cleanup, ReflectionSession, Registration, Scope, AUTOMATION_ID_ATTR};

pub use sync::{
    Backoff, Connection, ConnectionState, Connector, OutboundMessage, PagePublisher, SyncConfig,
    SyncHandle, WebSocketConnector, UI_STATE_UPDATE,
};
