//! Connection identity binding.
//!
//! The server has no memory of a previous TCP-level connection, so the bound
//! identity must be re-sent after every successful (re)connect. Anonymous
//! connections are valid; binding is optional.

use serde_json::json;

use crate::envelope::Frame;

/// Event name for the identity handshake frame.
pub const IDENTITY_EVENT: &str = "identity.bind";

/// Who this connection acts as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// A storefront customer, addressed by user id.
    User(String),
    /// The admin back-office room.
    Admin,
}

impl Identity {
    /// Build the handshake frame sent after each successful connect.
    pub fn bind_frame(&self) -> Frame {
        let data = match self {
            Self::User(id) => json!({ "user_id": id }),
            Self::Admin => json!({ "role": "admin" }),
        };
        Frame::new(IDENTITY_EVENT, data)
    }
}
