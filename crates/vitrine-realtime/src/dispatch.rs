//! Inbound frame dispatch.
//!
//! Every frame pulled off the transport flows through here. Frames on the
//! reserved `update` channel are unwrapped into `{topic, payload}` envelopes,
//! shape-checked against the known-topic catalog, and fanned out to the
//! registry. Anything else is dropped with a log line — a bad frame from the
//! server must never take the connection down.

use std::sync::Arc;

use tracing::{debug, warn};
use vitrine_core::{validate_payload, Envelope, Frame};

use crate::registry::Registry;

/// Routes inbound frames to registered listeners.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    /// Create a dispatcher fanning out to `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Handle one inbound frame.
    ///
    /// Non-`update` frames are ad hoc server notices and are only logged.
    /// Malformed envelopes and known-topic payloads with the wrong shape are
    /// dropped before any listener sees them.
    pub fn handle_frame(&self, frame: &Frame) {
        if !frame.is_update() {
            debug!(event = %frame.event, "ignoring non-update frame");
            return;
        }

        let envelope = match Envelope::from_frame_data(&frame.data) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%err, "dropping malformed update envelope");
                return;
            }
        };

        if let Err(err) = validate_payload(&envelope.topic, &envelope.payload) {
            warn!(%err, topic = %envelope.topic, "dropping payload with invalid shape");
            return;
        }

        let invoked = self.registry.dispatch(&envelope.topic, &envelope.payload);
        debug!(topic = %envelope.topic, invoked, "dispatched update");
    }
}
