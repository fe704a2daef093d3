//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format the admin dashboard writes. Each type implements [`Default`] with
//! production default values, and `#[serde(default)]` allows partial JSON —
//! missing fields get their default value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Vitrine realtime stack.
///
/// Loaded from `~/.vitrine/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "realtime": { "url": "wss://shop.example/rt", "reconnect": { "baseDelayMs": 500 } }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitrineSettings {
    /// Settings schema version.
    pub version: String,
    /// Realtime connection settings.
    pub realtime: RealtimeSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for VitrineSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            realtime: RealtimeSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Realtime connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// WebSocket endpoint for the persistent push connection.
    pub url: String,
    /// HTTP base URL for the long-poll fallback transport.
    pub poll_url: String,
    /// Whether to try WebSocket before falling back to long-poll.
    pub prefer_websocket: bool,
    /// Reconnect backoff policy.
    pub reconnect: ReconnectSettings,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8099/rt".to_string(),
            poll_url: "http://127.0.0.1:8099/rt".to_string(),
            prefer_websocket: true,
            reconnect: ReconnectSettings::default(),
        }
    }
}

/// Reconnect backoff policy.
///
/// Delays grow exponentially from `base_delay_ms`, capped at `max_delay_ms`,
/// for up to `max_attempts` consecutive failures per outage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconnectSettings {
    /// Consecutive failed attempts before giving up on the current outage.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single retry delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing filter directive (overridable via `RUST_LOG`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = VitrineSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert!(settings.realtime.prefer_websocket);
        assert_eq!(settings.realtime.reconnect.max_attempts, 10);
        assert_eq!(settings.realtime.reconnect.base_delay_ms, 500);
        assert_eq!(settings.realtime.reconnect.max_delay_ms, 30_000);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: VitrineSettings =
            serde_json::from_str(r#"{"realtime": {"url": "wss://shop.example/rt"}}"#).unwrap();
        assert_eq!(settings.realtime.url, "wss://shop.example/rt");
        assert_eq!(settings.realtime.reconnect.base_delay_ms, 500);
    }

    #[test]
    fn camel_case_field_names() {
        let settings: VitrineSettings = serde_json::from_str(
            r#"{"realtime": {"reconnect": {"maxAttempts": 3, "baseDelayMs": 100}}}"#,
        )
        .unwrap();
        assert_eq!(settings.realtime.reconnect.max_attempts, 3);
        assert_eq!(settings.realtime.reconnect.base_delay_ms, 100);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(VitrineSettings::default()).unwrap();
        assert!(json["realtime"]["reconnect"]["maxDelayMs"].is_u64());
        assert!(json["realtime"]["preferWebsocket"].is_boolean());
    }
}
