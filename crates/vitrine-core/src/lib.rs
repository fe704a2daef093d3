//! # vitrine-core
//!
//! Shared wire vocabulary for the Vitrine realtime update layer.
//!
//! - **Frames**: `{ "event": string, "data": any }` — the unit of the wire
//!   protocol in both directions
//! - **Envelopes**: `{ "topic": string, "payload": any }` carried on the
//!   reserved `update` channel
//! - **Known topics**: the storefront/admin event catalog with typed payload
//!   shapes validated at the dispatcher boundary
//! - **Identity**: the user/admin binding sent after every connect
//! - **Errors**: `ProtocolError` hierarchy via `thiserror`

#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod identity;
pub mod topics;

pub use envelope::{Envelope, Frame, UPDATE_CHANNEL};
pub use errors::ProtocolError;
pub use identity::{Identity, IDENTITY_EVENT};
pub use topics::{validate_payload, KnownTopic};
