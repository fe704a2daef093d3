//! Known topics and their typed payload shapes.
//!
//! The registry accepts any topic string, but for the topics the storefront
//! and admin screens actually consume we validate the payload shape at the
//! dispatcher boundary. A malformed payload fails fast with a typed
//! [`ProtocolError::PayloadShape`] instead of propagating an unexpected
//! shape to every subscriber. Topics outside this catalog pass through
//! opaque.
//!
//! Payload structs are deliberately permissive: required fields are the ones
//! consumers key on (ids, correlation fields), everything else is optional.
//! Correlation fields accept both snake_case and camelCase spellings since
//! the server emits both historically.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ProtocolError;

/// Catalog of topics with a declared payload shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnownTopic {
    /// A new order was placed.
    OrderCreated,
    /// An existing order changed (status, totals).
    OrderUpdated,
    /// Shipment tracking state changed at the logistics provider.
    ShipmentUpdated,
    /// A catalog product was created or edited.
    ProductUpdated,
    /// CMS content was published or edited.
    CmsUpdated,
    /// A live-chat message in some chat session.
    ChatMessage,
    /// A typing indicator for some chat session.
    ChatTyping,
    /// Periodic live-monitoring sample (active visitors).
    MonitorHeartbeat,
    /// A WhatsApp subscription was registered.
    WhatsappSubscribed,
}

impl KnownTopic {
    /// Look up a topic string in the catalog.
    pub fn parse(topic: &str) -> Option<Self> {
        match topic {
            "order_created" => Some(Self::OrderCreated),
            "order_updated" => Some(Self::OrderUpdated),
            "shipment_updated" => Some(Self::ShipmentUpdated),
            "product_updated" => Some(Self::ProductUpdated),
            "cms-update" => Some(Self::CmsUpdated),
            "live-chat:message" => Some(Self::ChatMessage),
            "live-chat:typing" => Some(Self::ChatTyping),
            "live-monitor:heartbeat" => Some(Self::MonitorHeartbeat),
            "whatsapp:subscribed" => Some(Self::WhatsappSubscribed),
            _ => None,
        }
    }

    /// Wire spelling of the topic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderCreated => "order_created",
            Self::OrderUpdated => "order_updated",
            Self::ShipmentUpdated => "shipment_updated",
            Self::ProductUpdated => "product_updated",
            Self::CmsUpdated => "cms-update",
            Self::ChatMessage => "live-chat:message",
            Self::ChatTyping => "live-chat:typing",
            Self::MonitorHeartbeat => "live-monitor:heartbeat",
            Self::WhatsappSubscribed => "whatsapp:subscribed",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Payload for `order_created` / `order_updated`.
#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    /// Order id.
    pub id: u64,
    /// Order status label, when the server includes one.
    #[serde(default)]
    pub status: Option<String>,
    /// Order total, when the server includes one.
    #[serde(default)]
    pub total: Option<f64>,
}

/// Payload for `shipment_updated`.
#[derive(Debug, Deserialize)]
pub struct ShipmentPayload {
    /// Order the shipment belongs to.
    #[serde(alias = "orderId")]
    pub order_id: u64,
    /// Carrier tracking number.
    #[serde(default, alias = "trackingNumber")]
    pub tracking_number: Option<String>,
    /// Carrier status label.
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload for `product_updated`.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    /// Product id.
    pub id: u64,
    /// Product title, when the server includes one.
    #[serde(default)]
    pub title: Option<String>,
}

/// Payload for `cms-update`.
#[derive(Debug, Deserialize)]
pub struct CmsPayload {
    /// Page slug that changed.
    #[serde(default)]
    pub slug: Option<String>,
    /// Numeric page id, when the server includes one.
    #[serde(default, alias = "pageId")]
    pub page_id: Option<u64>,
}

/// Payload for `live-chat:message`.
#[derive(Debug, Deserialize)]
pub struct ChatMessagePayload {
    /// Chat session the message belongs to — the scoping correlation field.
    #[serde(alias = "sessionId")]
    pub session_id: String,
    /// Sender display name or id.
    #[serde(default)]
    pub sender: Option<String>,
    /// Message body.
    #[serde(default)]
    pub body: Option<String>,
}

/// Payload for `live-chat:typing`.
#[derive(Debug, Deserialize)]
pub struct ChatTypingPayload {
    /// Chat session the indicator belongs to.
    #[serde(alias = "sessionId")]
    pub session_id: String,
    /// Whether the peer is currently typing.
    #[serde(alias = "isTyping")]
    pub is_typing: bool,
}

/// Payload for `live-monitor:heartbeat`.
#[derive(Debug, Deserialize)]
pub struct MonitorHeartbeatPayload {
    /// Active visitor count.
    #[serde(default)]
    pub visitors: Option<u64>,
    /// Page currently being sampled.
    #[serde(default)]
    pub page: Option<String>,
}

/// Payload for `whatsapp:subscribed`.
#[derive(Debug, Deserialize)]
pub struct WhatsappPayload {
    /// Subscriber phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Subscription state.
    #[serde(default)]
    pub subscribed: Option<bool>,
}

/// Validate a payload against the declared shape for its topic.
///
/// Unknown topics always pass; the core routes them opaquely.
pub fn validate_payload(topic: &str, payload: &Value) -> Result<(), ProtocolError> {
    let Some(known) = KnownTopic::parse(topic) else {
        return Ok(());
    };

    let result = match known {
        KnownTopic::OrderCreated | KnownTopic::OrderUpdated => {
            check::<OrderPayload>(payload)
        }
        KnownTopic::ShipmentUpdated => check::<ShipmentPayload>(payload),
        KnownTopic::ProductUpdated => check::<ProductPayload>(payload),
        KnownTopic::CmsUpdated => check::<CmsPayload>(payload),
        KnownTopic::ChatMessage => check::<ChatMessagePayload>(payload),
        KnownTopic::ChatTyping => check::<ChatTypingPayload>(payload),
        KnownTopic::MonitorHeartbeat => check::<MonitorHeartbeatPayload>(payload),
        KnownTopic::WhatsappSubscribed => check::<WhatsappPayload>(payload),
    };

    result.map_err(|e| ProtocolError::PayloadShape {
        topic: topic.to_string(),
        reason: e.to_string(),
    })
}

fn check<T: DeserializeOwned>(payload: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(payload).map(|_| ())
}
