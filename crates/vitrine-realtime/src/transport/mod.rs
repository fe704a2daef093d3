//! Pluggable wire transports.
//!
//! The client talks to the server through exactly one transport at a time:
//! WebSocket when it can be established, HTTP long-poll otherwise. Both carry
//! the same JSON frames, so everything above this module is transport-blind.

pub(crate) mod polling;
pub(crate) mod websocket;

use async_trait::async_trait;
use thiserror::Error;
use vitrine_core::Frame;

/// Errors raised by the wire transports.
///
/// All of these are absorbed by the reconnect loop; they never surface to
/// subscribers or emit callers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint URL could not be parsed.
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// WebSocket handshake or stream failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Long-poll HTTP request failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Which transport is carrying the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// Persistent WebSocket connection.
    WebSocket,
    /// HTTP long-poll fallback.
    LongPoll,
}

/// A bidirectional frame pipe to the server.
#[async_trait]
pub(crate) trait Transport: Send {
    /// Send one frame to the server.
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError>;

    /// Receive the next frame from the server.
    ///
    /// `Ok(None)` means the server closed the connection cleanly. Unparseable
    /// messages are logged and skipped rather than returned as errors.
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError>;

    /// Close the connection, best-effort.
    async fn close(&mut self);

    /// Which transport this is.
    fn kind(&self) -> TransportKind;
}
