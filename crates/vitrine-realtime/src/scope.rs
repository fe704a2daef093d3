//! Payload matchers for scoped subscriptions.
//!
//! Chat and monitoring topics are shared by every session; consumers narrow
//! them with a matcher over the payload. These helpers cover the common
//! cases — pass any closure to
//! [`RealtimeClient::subscribe_scoped`](crate::RealtimeClient::subscribe_scoped)
//! for anything fancier.

use serde_json::Value;

/// Match payloads whose `field` equals `expected`.
///
/// Payloads that are not objects, or lack the field, never match.
pub fn field_equals(
    field: impl Into<String>,
    expected: Value,
) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    let field = field.into();
    move |payload: &Value| payload.get(&field) == Some(&expected)
}

/// Match chat payloads belonging to one session.
///
/// Accepts both `session_id` and the historical `sessionId` spelling.
pub fn session_scope(session_id: impl Into<String>) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    let session_id = session_id.into();
    move |payload: &Value| {
        let field = payload
            .get("session_id")
            .or_else(|| payload.get("sessionId"));
        field.and_then(Value::as_str) == Some(session_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_equals_matches_exact_value() {
        let matcher = field_equals("status", json!("paid"));
        assert!(matcher(&json!({"status": "paid", "id": 1})));
        assert!(!matcher(&json!({"status": "pending"})));
    }

    #[test]
    fn field_equals_rejects_missing_field_and_non_objects() {
        let matcher = field_equals("status", json!("paid"));
        assert!(!matcher(&json!({"id": 1})));
        assert!(!matcher(&json!("paid")));
        assert!(!matcher(&Value::Null));
    }

    #[test]
    fn session_scope_matches_own_session_only() {
        let matcher = session_scope("sess_A");
        assert!(matcher(&json!({"session_id": "sess_A", "body": "hi"})));
        assert!(!matcher(&json!({"session_id": "sess_B", "body": "hi"})));
    }

    #[test]
    fn session_scope_accepts_camel_case_spelling() {
        let matcher = session_scope("sess_A");
        assert!(matcher(&json!({"sessionId": "sess_A"})));
    }

    #[test]
    fn session_scope_rejects_sessionless_payloads() {
        let matcher = session_scope("sess_A");
        assert!(!matcher(&json!({"body": "hi"})));
        assert!(!matcher(&Value::Null));
        assert!(!matcher(&json!({"session_id": 42})));
    }
}
