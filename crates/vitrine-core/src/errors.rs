//! Protocol error types.

use thiserror::Error;

/// Errors raised while decoding inbound wire traffic.
///
/// None of these escalate to subscribers: the offending frame or envelope is
/// dropped and logged, and the dispatch loop keeps running.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Inbound text was not a valid frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// The `update` frame's data was not a JSON object.
    #[error("update envelope is not an object")]
    InvalidEnvelope,

    /// The envelope lacked a usable `topic` field.
    #[error("update envelope is missing a topic")]
    MissingTopic,

    /// A known topic's payload did not match its declared shape.
    #[error("payload for topic `{topic}` has the wrong shape: {reason}")]
    PayloadShape {
        /// Topic whose payload failed validation.
        topic: String,
        /// Deserialization failure detail.
        reason: String,
    },
}
