//! Wire frames and the generic update envelope.
//!
//! Every message in either direction is a [`Frame`]: a named event plus an
//! arbitrary JSON `data` value, sent as a single JSON text message. Server
//! pushes that carry catalog/chat/CMS updates all arrive on one reserved
//! event name ([`UPDATE_CHANNEL`]) whose data is an [`Envelope`] — the topic
//! string subscribers register against plus an opaque payload.
//!
//! Frames with any other event name are ad hoc server notices; the transport
//! logs them and they never reach subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProtocolError;

/// Reserved event name carrying topic envelopes.
pub const UPDATE_CHANNEL: &str = "update";

/// A single wire message: named event plus JSON data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name. `update` is reserved for envelopes.
    pub event: String,
    /// Arbitrary JSON payload for the event.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Build a frame from an event name and data value.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Parse a frame from a JSON text message.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::MalformedFrame)
    }

    /// Serialize the frame for transmission.
    ///
    /// Serialization of `(String, Value)` cannot fail, so this is infallible.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Whether this frame is on the reserved envelope channel.
    pub fn is_update(&self) -> bool {
        self.event == UPDATE_CHANNEL
    }
}

/// The generic `{topic, payload}` wrapper carried on the reserved channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Topic string subscribers register against.
    pub topic: String,
    /// Opaque payload; scoping fields inside it are a consumer contract.
    pub payload: Value,
}

impl Envelope {
    /// Extract an envelope from the `data` of an `update` frame.
    ///
    /// The topic is authoritative here: it must be a non-empty string field
    /// named `topic`. A missing or non-string topic is a protocol error and
    /// the envelope is dropped by the dispatcher.
    pub fn from_frame_data(data: &Value) -> Result<Self, ProtocolError> {
        let obj = data.as_object().ok_or(ProtocolError::InvalidEnvelope)?;
        let topic = match obj.get("topic") {
            Some(Value::String(t)) if !t.is_empty() => t.clone(),
            _ => return Err(ProtocolError::MissingTopic),
        };
        let payload = obj.get("payload").cloned().unwrap_or(Value::Null);
        Ok(Self { topic, payload })
    }

    /// Wrap the envelope back into an `update` frame (server-side shape,
    /// used by tests and tooling).
    pub fn into_frame(self) -> Frame {
        Frame::new(
            UPDATE_CHANNEL,
            serde_json::json!({ "topic": self.topic, "payload": self.payload }),
        )
    }
}
