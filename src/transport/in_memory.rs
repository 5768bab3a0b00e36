use tokio::sync::mpsc;

use crate::transport::{Connector, Transport};

/// One end of an in-process connection.
pub struct InMemoryTransport {
    tx: Option<mpsc::UnboundedSender<String>>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(tx1),
                rx: rx2,
            },
            Self {
                tx: Some(tx2),
                rx: rx1,
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, msg: String) -> anyhow::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is closed"))?;
        tx.send(msg).map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.tx = None;
        self.rx.close();
        Ok(())
    }
}

/// Connector handing the server half of every new connection to a listener.
pub struct InMemoryConnector {
    accept_tx: mpsc::UnboundedSender<InMemoryTransport>,
}

impl InMemoryConnector {
    /// The receiver yields the peer of each connection as it is opened.
    /// Once it is dropped every connect attempt fails.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InMemoryTransport>) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        (Self { accept_tx }, accept_rx)
    }
}

#[async_trait::async_trait]
impl Connector for InMemoryConnector {
    async fn connect(&self) -> anyhow::Result<Box<dyn Transport>> {
        let (client, server) = InMemoryTransport::pair();
        self.accept_tx
            .send(server)
            .map_err(|_| anyhow::anyhow!("Connection refused"))?;
        Ok(Box::new(client))
    }
}
