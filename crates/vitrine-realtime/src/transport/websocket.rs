//! WebSocket transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use vitrine_core::Frame;

use super::{Transport, TransportError, TransportKind};

/// Frame pipe over a single WebSocket connection.
pub(crate) struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Establish a connection to `url` (`ws://` or `wss://`).
    pub(crate) async fn connect(url: &str) -> Result<Self, TransportError> {
        let (stream, _response) = connect_async(url).await?;
        debug!(url, "websocket connected");
        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.stream.send(Message::text(frame.to_json())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => match Frame::from_json(&text) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(err) => {
                        warn!(%err, "skipping unparseable text message");
                    }
                },
                // Pings are answered by the stream itself on the next write.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Binary(_) | Message::Frame(_))) => {
                    warn!("skipping unexpected non-text message");
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Err(err)) => return Err(err.into()),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }

    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }
}
