//! Transport seam.
//!
//! The channel only needs "connect", "send a text frame" and "tell me when
//! the peer goes away". [`WebSocketConnector`] provides that over a
//! WebSocket; tests plug in scripted connectors.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::SyncError;

/// Opens connections to the external observer.
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, SyncError>> + Send;
}

/// An open connection.
pub trait Connection: Send + 'static {
    /// Send one text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Wait for the next inbound frame.
    ///
    /// `None` once the peer has closed. Frame contents are not used.
    fn recv(&mut self) -> impl Future<Output = Option<Result<(), SyncError>>> + Send;
}

// =============================================================================
// WebSocket
// =============================================================================

/// Connects to a fixed WebSocket URL.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    async fn connect(&self) -> Result<WebSocketConnection, SyncError> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|source| SyncError::Connect {
                url: self.url.clone(),
                source,
            })?;
        Ok(WebSocketConnection { stream })
    }
}

pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connection for WebSocketConnection {
    async fn send_text(&mut self, text: String) -> Result<(), SyncError> {
        self.stream.send(Message::Text(text)).await.map_err(SyncError::Send)
    }

    async fn recv(&mut self) -> Option<Result<(), SyncError>> {
        match self.stream.next().await? {
            Ok(Message::Close(_)) => None,
            Ok(_) => Some(Ok(())),
            Err(err) => Some(Err(SyncError::Receive(err))),
        }
    }
}
