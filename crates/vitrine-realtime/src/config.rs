//! Client configuration.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use vitrine_settings::RealtimeSettings;

/// Configuration for a [`RealtimeClient`](crate::RealtimeClient).
///
/// Constructed by hand in tests or converted from
/// [`vitrine_settings::RealtimeSettings`] in production.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8099/rt`.
    pub url: String,
    /// HTTP base URL for the long-poll fallback, e.g. `http://127.0.0.1:8099/rt`.
    pub poll_url: String,
    /// Try WebSocket before falling back to long-poll.
    pub prefer_websocket: bool,
    /// Reconnect backoff policy.
    pub reconnect: ReconnectPolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self::from(&RealtimeSettings::default())
    }
}

impl From<&RealtimeSettings> for RealtimeConfig {
    fn from(settings: &RealtimeSettings) -> Self {
        Self {
            url: settings.url.clone(),
            poll_url: settings.poll_url.clone(),
            prefer_websocket: settings.prefer_websocket,
            reconnect: ReconnectPolicy {
                max_attempts: settings.reconnect.max_attempts,
                base_delay: Duration::from_millis(settings.reconnect.base_delay_ms),
                max_delay: Duration::from_millis(settings.reconnect.max_delay_ms),
            },
        }
    }
}

/// Exponential backoff policy for reconnect attempts.
///
/// Delays double per consecutive failure starting from `base_delay`, capped at
/// `max_delay`, with ±25% jitter so a fleet of clients does not stampede the
/// server after an outage. After `max_attempts` consecutive failures the
/// client gives up on the outage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay (before jitter is applied).
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (zero-based), with jitter applied.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter: f64 = rand::rng().random_range(0.75..=1.25);
        capped.mul_f64(jitter).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        let cfg = RealtimeConfig::default();
        assert!(cfg.prefer_websocket);
        assert_eq!(cfg.reconnect.max_attempts, 10);
        assert_eq!(cfg.reconnect.base_delay, Duration::from_millis(500));
        assert_eq!(cfg.reconnect.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn from_settings_converts_millis() {
        let mut settings = RealtimeSettings::default();
        settings.reconnect.base_delay_ms = 100;
        settings.reconnect.max_delay_ms = 2000;
        let cfg = RealtimeConfig::from(&settings);
        assert_eq!(cfg.reconnect.base_delay, Duration::from_millis(100));
        assert_eq!(cfg.reconnect.max_delay, Duration::from_millis(2000));
    }

    #[test]
    fn delay_grows_exponentially_within_jitter_bounds() {
        let policy = ReconnectPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
        };
        for attempt in 0..4u32 {
            let expected = Duration::from_millis(100 * 2u64.pow(attempt));
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay >= expected.mul_f64(0.75), "attempt {attempt}: {delay:?}");
            assert!(delay <= expected.mul_f64(1.25), "attempt {attempt}: {delay:?}");
        }
    }

    #[test]
    fn delay_never_exceeds_max() {
        let policy = ReconnectPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        };
        for attempt in 0..32u32 {
            assert!(policy.delay_for_attempt(attempt) <= Duration::from_secs(5));
        }
    }

    #[test]
    fn huge_attempt_does_not_overflow() {
        let policy = ReconnectPolicy::default();
        let delay = policy.delay_for_attempt(u32::MAX);
        assert!(delay <= policy.max_delay);
    }
}
