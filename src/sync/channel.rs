//! Outbound Sync Channel - Ships page state to an external observer.
//!
//! A background task owns the connection and runs this state machine:
//!
//! ```text
//! Disconnected → Connecting → Connected → Disconnected (error/close) → ...
//! ```
//!
//! While connected it sends the full page state:
//! - immediately on connect
//! - whenever a new page state is published
//! - every `snapshot_interval` as a resync
//!
//! On a drop it retries with exponential backoff. After
//! `max_reconnect_attempts` consecutive failures it stays `Disconnected`
//! for the rest of the process. None of this affects the local registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::config::SyncConfig;
use super::message::OutboundMessage;
use super::transport::{Connection, Connector, WebSocketConnector};
use crate::engine::PageState;
use crate::error::{ConfigError, SyncError};

// =============================================================================
// Connection State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

// =============================================================================
// Publisher
// =============================================================================

/// Write side of the page-state slot the channel reads from.
///
/// Publishing never blocks: the slot keeps only the newest page.
#[derive(Clone)]
pub struct PagePublisher {
    pages: Arc<watch::Sender<PageState>>,
}

impl PagePublisher {
    pub fn publish(&self, page: PageState) {
        self.pages.send_replace(page);
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Owner of a running sync task. Dropping it stops the task.
pub struct SyncHandle {
    pages: Arc<watch::Sender<PageState>>,
    states: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Spawn the channel task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime and `config.enabled` is set.
    pub fn spawn<C: Connector>(config: SyncConfig, connector: C) -> Self {
        let (pages, page_rx) = watch::channel(PageState::default());
        let (state_tx, states) = watch::channel(ConnectionState::Disconnected);

        let task = if config.enabled {
            Some(tokio::spawn(run(config, connector, page_rx, state_tx)))
        } else {
            debug!("ui reflection sync disabled");
            None
        };

        Self {
            pages: Arc::new(pages),
            states,
            task,
        }
    }

    /// Validate `config` and spawn a WebSocket channel to `config.url`.
    pub fn connect_websocket(config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let connector = WebSocketConnector::new(config.url.clone());
        Ok(Self::spawn(config, connector))
    }

    pub fn publisher(&self) -> PagePublisher {
        PagePublisher {
            pages: Arc::clone(&self.pages),
        }
    }

    /// Publish a page state directly, without a session.
    pub fn publish(&self, page: PageState) {
        self.pages.send_replace(page);
    }

    pub fn state(&self) -> ConnectionState {
        *self.states.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.states.clone()
    }

    /// Whether the task has ended (gave up, or was never started).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the task.
    pub fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Task
// =============================================================================

async fn run<C: Connector>(
    config: SyncConfig,
    connector: C,
    mut pages: watch::Receiver<PageState>,
    state: watch::Sender<ConnectionState>,
) {
    let backoff = config.backoff();
    let period = config.snapshot_interval();
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            if !backoff.allows_attempt(attempt) {
                warn!(
                    attempts = attempt - 1,
                    "giving up on ui reflection channel until restart"
                );
                return;
            }
            let delay = backoff.delay(attempt);
            debug!(attempt, ?delay, "waiting before reconnect");
            sleep(delay).await;
        }

        state.send_replace(ConnectionState::Connecting);
        match connector.connect().await {
            Ok(mut conn) => {
                info!(url = %config.url, "ui reflection channel connected");
                state.send_replace(ConnectionState::Connected);
                let outcome = serve(&mut conn, &mut pages, period).await;
                state.send_replace(ConnectionState::Disconnected);
                match outcome {
                    Ok(()) => {
                        debug!("page publisher gone; stopping ui reflection channel");
                        return;
                    }
                    Err(err) => warn!(error = %err, "ui reflection channel dropped"),
                }
                attempt = 1;
            }
            Err(err) => {
                state.send_replace(ConnectionState::Disconnected);
                warn!(attempt, error = %err, "ui reflection connect failed");
                attempt += 1;
            }
        }
    }
}

enum Wake {
    Page(bool),
    Tick,
    Inbound(Option<Result<(), SyncError>>),
}

/// Serve one connection until it drops.
///
/// `Ok(())` means the publisher side is gone and the task should end.
async fn serve<C: Connection>(
    conn: &mut C,
    pages: &mut watch::Receiver<PageState>,
    period: Duration,
) -> Result<(), SyncError> {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let snapshot = pages.borrow_and_update().clone();
    send_page(conn, &snapshot).await?;

    loop {
        let wake = tokio::select! {
            changed = pages.changed() => Wake::Page(changed.is_ok()),
            _ = ticker.tick() => Wake::Tick,
            inbound = conn.recv() => Wake::Inbound(inbound),
        };

        match wake {
            Wake::Page(false) => return Ok(()),
            Wake::Page(true) => {
                let page = pages.borrow_and_update().clone();
                send_page(conn, &page).await?;
            }
            Wake::Tick => {
                let page = pages.borrow().clone();
                send_page(conn, &page).await?;
            }
            Wake::Inbound(Some(Ok(()))) => {}
            Wake::Inbound(Some(Err(err))) => return Err(err),
            Wake::Inbound(None) => return Err(SyncError::Closed),
        }
    }
}

async fn send_page<C: Connection>(conn: &mut C, page: &PageState) -> Result<(), SyncError> {
    let text = OutboundMessage::UiStateUpdate(page).encode()?;
    conn.send_text(text).await
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio_tungstenite::tungstenite;

    #[derive(Default)]
    struct Script {
        accept: VecDeque<bool>,
        attempts: Vec<Instant>,
        sent: Arc<Mutex<Vec<String>>>,
        kill: Option<mpsc::UnboundedSender<()>>,
    }

    /// Connector that accepts or refuses according to a fixed script.
    #[derive(Clone, Default)]
    struct ScriptedConnector {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedConnector {
        fn new(accept: impl IntoIterator<Item = bool>) -> Self {
            let connector = Self::default();
            connector.script.lock().unwrap().accept = accept.into_iter().collect();
            connector
        }

        fn attempts(&self) -> Vec<Instant> {
            self.script.lock().unwrap().attempts.clone()
        }

        fn sent(&self) -> Vec<String> {
            self.script.lock().unwrap().sent.lock().unwrap().clone()
        }

        fn drop_connection(&self) {
            self.script.lock().unwrap().kill.take();
        }
    }

    struct ScriptedConnection {
        sent: Arc<Mutex<Vec<String>>>,
        kill: mpsc::UnboundedReceiver<()>,
    }

    impl Connector for ScriptedConnector {
        type Connection = ScriptedConnection;

        async fn connect(&self) -> Result<ScriptedConnection, SyncError> {
            // A real handshake never resolves in the same poll.
            tokio::task::yield_now().await;
            let mut script = self.script.lock().unwrap();
            script.attempts.push(Instant::now());
            if script.accept.pop_front().unwrap_or(false) {
                let (tx, rx) = mpsc::unbounded_channel();
                script.kill = Some(tx);
                Ok(ScriptedConnection {
                    sent: Arc::clone(&script.sent),
                    kill: rx,
                })
            } else {
                Err(SyncError::Connect {
                    url: "scripted".to_string(),
                    source: tungstenite::Error::ConnectionClosed,
                })
            }
        }
    }

    impl Connection for ScriptedConnection {
        async fn send_text(&mut self, text: String) -> Result<(), SyncError> {
            self.sent.lock().unwrap().push(text);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<(), SyncError>> {
            self.kill.recv().await;
            None
        }
    }

    fn fast_config() -> SyncConfig {
        SyncConfig {
            reconnect_base_ms: 100,
            reconnect_max_ms: 10_000,
            max_reconnect_attempts: 5,
            ..SyncConfig::default()
        }
    }

    fn page(title: &str) -> PageState {
        PageState {
            title: title.to_string(),
            ..PageState::default()
        }
    }

    fn titles(sent: &[String]) -> Vec<String> {
        sent.iter()
            .map(|text| {
                let json: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(json["type"], "UI_STATE_UPDATE");
                json["payload"]["title"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_sends_snapshot_on_connect() {
        let connector = ScriptedConnector::new([true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        handle.publish(page("first"));

        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
        sleep(Duration::from_millis(1)).await;

        assert_eq!(titles(&connector.sent()), vec!["first"]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_sends_on_change() {
        let connector = ScriptedConnector::new([true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
        sleep(Duration::from_millis(1)).await;

        handle.publisher().publish(page("changed"));
        sleep(Duration::from_millis(1)).await;

        assert_eq!(titles(&connector.sent()), vec!["", "changed"]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_periodic_snapshot() {
        let connector = ScriptedConnector::new([true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        handle.publish(page("steady"));
        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();

        sleep(Duration::from_millis(5_001)).await;
        assert_eq!(connector.sent().len(), 2);

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(titles(&connector.sent()), vec!["steady"; 4]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_reconnect_backoff_then_give_up() {
        let connector = ScriptedConnector::new([true, false, false, false, false, false, true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();

        connector.drop_connection();
        states.wait_for(|s| *s != ConnectionState::Connected).await.unwrap();

        sleep(Duration::from_secs(60)).await;

        let attempts = connector.attempts();
        assert_eq!(attempts.len(), 6, "initial connect plus five reconnects");
        let gaps: Vec<u128> = attempts[1..]
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_millis())
            .collect();
        assert_eq!(gaps, vec![200, 400, 800, 1600]);
        assert_eq!(handle.state(), ConnectionState::Disconnected);
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_reconnect_state_sequence() {
        use ConnectionState::*;

        let connector = ScriptedConnector::new([true, false, false, false, false, false]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        let mut watcher = handle.subscribe_state();
        let recorder = tokio::spawn(async move {
            let mut seen = Vec::new();
            while watcher.changed().await.is_ok() {
                seen.push(*watcher.borrow_and_update());
            }
            seen
        });

        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == Connected).await.unwrap();
        connector.drop_connection();

        // The task gives up after five refusals and drops its state sender.
        let seen = recorder.await.unwrap();
        let mut expected = vec![Connecting, Connected, Disconnected];
        for _ in 0..5 {
            expected.extend([Connecting, Disconnected]);
        }
        assert_eq!(seen, expected);
        assert_eq!(handle.state(), Disconnected);
        assert!(handle.is_finished());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_reconnect_succeeds_and_resends() {
        let connector = ScriptedConnector::new([true, false, true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        handle.publish(page("kept"));
        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
        sleep(Duration::from_millis(1)).await;

        connector.drop_connection();
        sleep(Duration::from_millis(1_000)).await;

        assert_eq!(handle.state(), ConnectionState::Connected);
        assert_eq!(connector.attempts().len(), 3);
        assert_eq!(titles(&connector.sent()), vec!["kept", "kept"]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_initial_failure_enters_backoff() {
        let connector = ScriptedConnector::new([false, true]);
        let handle = SyncHandle::spawn(fast_config(), connector.clone());
        let mut states = handle.subscribe_state();
        states.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();

        let attempts = connector.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!((attempts[1] - attempts[0]).as_millis(), 100);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_disabled_never_connects() {
        let connector = ScriptedConnector::new([true]);
        let config = SyncConfig {
            enabled: false,
            ..fast_config()
        };
        let handle = SyncHandle::spawn(config, connector.clone());
        sleep(Duration::from_secs(10)).await;

        assert!(connector.attempts().is_empty());
        assert_eq!(handle.state(), ConnectionState::Disconnected);
        assert!(handle.is_finished());
    }
}
