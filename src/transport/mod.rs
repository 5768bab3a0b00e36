//! Connection lifecycle: text-frame transports, connectors, and the
//! reconnecting [`TransportClient`].
//!
//! The client owns a background task that holds the live connection. Outgoing
//! frames go in over a command channel, and connection events come back out over
//! a bounded event channel in arrival order. When a connection drops or cannot
//! be opened the task waits a fixed delay and tries again, forever, until
//! [`TransportClient::disconnect`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;

pub mod in_memory;
pub mod ws;

pub use in_memory::{InMemoryConnector, InMemoryTransport};
pub use ws::{WsConnector, WsTransport};

/// How long [`TransportClient::disconnect`] waits for the task before aborting it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A bidirectional stream of text frames.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, msg: String) -> anyhow::Result<()>;

    /// Next inbound frame. Errors once the connection is gone.
    async fn recv(&mut self) -> anyhow::Result<String>;

    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Opens fresh connections to the game server.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> anyhow::Result<Box<dyn Transport>>;
}

/// What the connection task reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    /// An open connection was lost. A reconnect is already scheduled.
    Disconnected,
    /// A connect attempt or a send failed.
    Error(String),
    /// One inbound text frame.
    Message(String),
}

/// Handle to the background connection task.
pub struct TransportClient {
    cmd_tx: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TransportClient {
    /// Spawn the connection task and return the handle plus its event stream.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        connector: Arc<dyn Connector>,
        config: &ClientConfig,
    ) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(connection_loop(
            connector,
            cmd_rx,
            event_tx,
            Arc::clone(&connected),
            shutdown_rx,
            config.reconnect_delay,
        ));

        let client = Self {
            cmd_tx,
            connected,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
        };
        (client, event_rx)
    }

    /// Queue a frame for the open connection. Frames sent while no connection
    /// is open are dropped, not buffered.
    pub fn send(&self, msg: String) {
        if !self.is_connected() {
            debug!("not connected; dropping outbound frame");
            return;
        }
        if self.cmd_tx.send(msg).is_err() {
            debug!("connection task gone; dropping outbound frame");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Stop for good: no further events are delivered, the open connection is
    /// closed, and any pending reconnect is cancelled.
    pub async fn disconnect(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("connection task failed: {}", e),
                Err(_) => {
                    warn!("connection task did not stop in time; aborting");
                    task.abort();
                }
            }
        }
        self.connected.store(false, Ordering::Release);
        info!("transport disconnected");
    }
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient")
            .field("connected", &self.is_connected())
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl Drop for TransportClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Why a live session ended.
enum SessionEnd {
    Shutdown,
    Lost,
}

async fn connection_loop(
    connector: Arc<dyn Connector>,
    mut cmd_rx: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::Sender<TransportEvent>,
    connected: Arc<AtomicBool>,
    mut shutdown_rx: oneshot::Receiver<()>,
    reconnect_delay: Duration,
) {
    loop {
        let attempt = tokio::select! {
            _ = &mut shutdown_rx => return,
            res = connector.connect() => res,
        };

        match attempt {
            Ok(mut transport) => {
                // Anything queued while offline is stale.
                while cmd_rx.try_recv().is_ok() {}
                connected.store(true, Ordering::Release);
                info!("connected");
                emit(&event_tx, TransportEvent::Connected).await;

                let end = run_session(
                    transport.as_mut(),
                    &mut cmd_rx,
                    &event_tx,
                    &mut shutdown_rx,
                )
                .await;
                connected.store(false, Ordering::Release);

                if let SessionEnd::Shutdown = end {
                    // Detach the subscriber before closing the socket.
                    drop(event_tx);
                    if let Err(e) = transport.close().await {
                        debug!("close failed: {}", e);
                    }
                    return;
                }
                info!("connection lost");
                emit(&event_tx, TransportEvent::Disconnected).await;
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                emit(&event_tx, TransportEvent::Error(e.to_string())).await;
            }
        }

        debug!("reconnecting in {:?}", reconnect_delay);
        tokio::select! {
            _ = &mut shutdown_rx => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

async fn run_session(
    transport: &mut dyn Transport,
    cmd_rx: &mut mpsc::UnboundedReceiver<String>,
    event_tx: &mpsc::Sender<TransportEvent>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => return SessionEnd::Shutdown,
            cmd = cmd_rx.recv() => match cmd {
                Some(msg) => {
                    if let Err(e) = transport.send(msg).await {
                        warn!("send failed: {}", e);
                        emit(event_tx, TransportEvent::Error(e.to_string())).await;
                        return SessionEnd::Lost;
                    }
                }
                None => return SessionEnd::Shutdown,
            },
            incoming = transport.recv() => match incoming {
                Ok(text) => emit(event_tx, TransportEvent::Message(text)).await,
                Err(e) => {
                    debug!("receive ended: {}", e);
                    return SessionEnd::Lost;
                }
            },
        }
    }
}

async fn emit(event_tx: &mpsc::Sender<TransportEvent>, event: TransportEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("event receiver dropped");
    }
}
