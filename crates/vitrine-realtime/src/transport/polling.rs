//! HTTP long-poll fallback transport.
//!
//! Wire shape:
//! - `GET {base}/poll?cursor=N` → `{"cursor": M, "frames": [Frame, ...]}`
//!   The server holds the request open until frames are available or its
//!   poll window times out (returning an empty batch).
//! - `POST {base}/emit` with a JSON [`Frame`] body for the outbound direction.
//!
//! The cursor is server-assigned and strictly increasing; replaying the last
//! cursor after a network blip yields only frames the client has not seen.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use vitrine_core::Frame;

use super::{Transport, TransportError, TransportKind};

/// Pause between polls when the server returned an empty batch immediately.
const IDLE_POLL_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct PollResponse {
    cursor: u64,
    #[serde(default)]
    frames: Vec<Frame>,
}

/// Frame pipe over repeated HTTP long-poll requests.
pub(crate) struct LongPollTransport {
    http: reqwest::Client,
    base: String,
    cursor: u64,
    pending: VecDeque<Frame>,
}

impl LongPollTransport {
    /// Probe `base` with an initial poll and start a session from cursor 0.
    pub(crate) async fn connect(base: &str) -> Result<Self, TransportError> {
        // Validate the URL up front so a bad setting fails the connect
        // attempt instead of every poll.
        let _ = Url::parse(base)?;
        let mut transport = Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            cursor: 0,
            pending: VecDeque::new(),
        };
        transport.poll_once().await?;
        debug!(base = %transport.base, cursor = transport.cursor, "long-poll session started");
        Ok(transport)
    }

    async fn poll_once(&mut self) -> Result<(), TransportError> {
        let url = format!("{}/poll?cursor={}", self.base, self.cursor);
        let response: PollResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        self.cursor = response.cursor;
        self.pending.extend(response.frames);
        Ok(())
    }
}

#[async_trait]
impl Transport for LongPollTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let url = format!("{}/emit", self.base);
        let _ = self
            .http
            .post(&url)
            .json(frame)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(Some(frame));
            }
            self.poll_once().await?;
            if self.pending.is_empty() {
                tokio::time::sleep(IDLE_POLL_DELAY).await;
            }
        }
    }

    async fn close(&mut self) {
        self.pending.clear();
    }

    fn kind(&self) -> TransportKind {
        TransportKind::LongPoll
    }
}
