//! Persisted cache layout.
//!
//! Cached values are wrapped in an envelope carrying their capture time and
//! time-to-live, stored under `<prefix>_<user_id>_<logical_key>`. A read past
//! its TTL is treated as absent, never returned stale.

use serde::{Deserialize, Serialize};

/// Namespace prefix for every persisted cache entry.
pub const CACHE_PREFIX: &str = "flocktracker";

/// Logical key for the aggregate app-data snapshot.
pub const APP_DATA_KEY: &str = "app_data";

/// Logical key for the cached subscription status.
pub const SUBSCRIPTION_KEY: &str = "subscription_status";

/// Build the storage key for one user's logical dataset.
pub fn cache_key(user_id: &str, logical_key: &str) -> String {
    format!("{}_{}_{}", CACHE_PREFIX, user_id, logical_key)
}

/// Prefix shared by every entry in one user's namespace.
pub fn user_namespace(user_id: &str) -> String {
    format!("{}_{}_", CACHE_PREFIX, user_id)
}

/// Wire format of a persisted cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope<T> {
    pub data: T,
    /// Capture time, epoch milliseconds.
    pub timestamp: i64,
    /// Time-to-live, milliseconds.
    pub ttl: i64,
}

impl<T> CacheEnvelope<T> {
    pub fn new(data: T, now_ms: i64, ttl_minutes: i64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl: ttl_minutes * 60_000,
        }
    }

    /// True once the envelope's age exceeds its TTL.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp > self.ttl
    }

    /// Milliseconds since capture, clamped at zero for clock skew.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.timestamp).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            cache_key("user-42", "app_data"),
            "flocktracker_user-42_app_data"
        );
        assert!(cache_key("user-42", APP_DATA_KEY).starts_with(&user_namespace("user-42")));
    }

    #[test]
    fn test_envelope_fresh_within_ttl() {
        let env = CacheEnvelope::new("payload", 1_000_000, 5);
        assert!(!env.is_expired(1_000_000));
        // One millisecond short of the 5-minute TTL.
        assert!(!env.is_expired(1_000_000 + 5 * 60_000));
    }

    #[test]
    fn test_envelope_expired_past_ttl() {
        let env = CacheEnvelope::new("payload", 1_000_000, 5);
        assert!(env.is_expired(1_000_000 + 5 * 60_000 + 1));
    }

    #[test]
    fn test_envelope_round_trip() {
        let env = CacheEnvelope::new(vec![1, 2, 3], 1_700_000_000_000, 60);
        let json = serde_json::to_string(&env).unwrap();
        let back: CacheEnvelope<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
        assert_eq!(back.ttl, 3_600_000);
    }

    #[test]
    fn test_age_clamped_for_clock_skew() {
        let env = CacheEnvelope::new((), 2_000, 5);
        assert_eq!(env.age_ms(1_000), 0);
        assert_eq!(env.age_ms(3_500), 1_500);
    }
}
