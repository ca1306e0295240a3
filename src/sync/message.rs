//! Wire format.
//!
//! One message type, sent as a JSON text frame:
//!
//! ```text
//! {"type": "UI_STATE_UPDATE", "payload": { "id": ..., "title": ..., "url": ..., "components": [...] }}
//! ```

use serde::Serialize;

use crate::engine::PageState;
use crate::error::SyncError;

/// Event name of the page state message.
pub const UI_STATE_UPDATE: &str = "UI_STATE_UPDATE";

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage<'a> {
    #[serde(rename = "UI_STATE_UPDATE")]
    UiStateUpdate(&'a PageState),
}

impl OutboundMessage<'_> {
    pub fn encode(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }
}
