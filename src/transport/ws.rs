use futures_util::{SinkExt, StreamExt};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::ClientConfig;
use crate::transport::{Connector, Transport};

/// WebSocket connection carrying JSON text frames.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, msg: String) -> anyhow::Result<()> {
        self.stream
            .send(Message::Text(msg))
            .await
            .map_err(|e| anyhow::anyhow!("Write error: {}", e))
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(text),
                    Err(_) => debug!("skipping non-utf8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    return Err(anyhow::anyhow!("Connection closed by peer"))
                }
                // Pings are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(anyhow::anyhow!("Read error: {}", e)),
            }
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Connects to `ws[s]://<host>/ws`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Connector for the endpoint named in `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.endpoint.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> anyhow::Result<Box<dyn Transport>> {
        debug!("connecting to {}", self.url);
        Ok(Box::new(WsTransport::connect(&self.url).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::endpoint_url;

    #[test]
    fn connector_targets_configured_endpoint() {
        let config = ClientConfig::new(endpoint_url("game.example.com", true));
        assert_eq!(
            WsConnector::from_config(&config).url(),
            "wss://game.example.com/ws"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_to_connect() {
        let connector = WsConnector::new("ws://127.0.0.1:1/ws");
        assert!(connector.connect().await.is_err());
    }
}
