//! # vitrine-realtime
//!
//! Realtime update distribution client for the Vitrine storefront and admin.
//!
//! A single persistent server-push connection carries `{event, data}` frames;
//! frames on the reserved `update` channel wrap `{topic, payload}` envelopes
//! that are validated and fanned out to registered listeners. The crate
//! provides:
//!
//! - [`RealtimeClient`] — constructible, clonable connection service with
//!   automatic reconnect and identity re-binding
//! - [`Subscription`] — identity-based listener handles with drop-to-unsubscribe
//! - [`scope`] — payload matchers for session-scoped subscriptions
//! - WebSocket transport with HTTP long-poll fallback (internal)

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod registry;
pub mod scope;
mod transport;

pub use client::RealtimeClient;
pub use config::{RealtimeConfig, ReconnectPolicy};
pub use dispatch::Dispatcher;
pub use registry::{Callback, Registry, Subscription};

// Re-export the wire vocabulary so consumers need only one import.
pub use vitrine_core::{Envelope, Frame, Identity, ProtocolError, UPDATE_CHANNEL};
