//! Cached result of the "is Ollama installed?" probe.
//!
//! The record is stored as `{"timestamp": <epoch ms>, "installed": <bool>}`
//! and trusted for a fixed window before the probe has to run again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a cached probe result is trusted.
pub const CACHE_TTL_HOURS: i64 = 24;

pub fn default_cache_ttl() -> Duration {
    Duration::hours(CACHE_TTL_HOURS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallCheck {
    /// When the probe ran, in epoch milliseconds
    pub timestamp: i64,
    /// What the probe reported
    pub installed: bool,
}

impl InstallCheck {
    pub fn new(checked_at: DateTime<Utc>, installed: bool) -> Self {
        Self {
            timestamp: checked_at.timestamp_millis(),
            installed,
        }
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Age of the record at `now`. Negative if the clock moved backwards,
    /// `None` if the timestamp is too far off to represent.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.timestamp_millis()
            .checked_sub(self.timestamp)
            .and_then(Duration::try_milliseconds)
    }

    /// A record is stale once its age strictly exceeds `ttl`, or when its
    /// age cannot be computed at all.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.age(now) {
            Some(age) => age > ttl,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let json = serde_json::to_string(&InstallCheck::new(at, true)).unwrap();
        assert_eq!(json, r#"{"timestamp":1700000000123,"installed":true}"#);
    }

    #[test]
    fn test_fresh_within_ttl() {
        let now = Utc::now();
        let check = InstallCheck::new(now - Duration::hours(1), true);
        assert!(!check.is_stale(now, default_cache_ttl()));
    }

    #[test]
    fn test_stale_after_ttl() {
        let now = Utc::now();
        let check = InstallCheck::new(now - Duration::hours(25), true);
        assert!(check.is_stale(now, default_cache_ttl()));
    }

    #[test]
    fn test_exactly_ttl_is_still_fresh() {
        let now = Utc::now();
        let check = InstallCheck::new(now - default_cache_ttl(), false);
        assert!(!check.is_stale(now, default_cache_ttl()));
    }

    #[test]
    fn test_future_timestamp_is_not_stale() {
        let now = Utc::now();
        let check = InstallCheck::new(now + Duration::minutes(5), true);
        assert!(check.age(now).unwrap() < Duration::zero());
        assert!(!check.is_stale(now, default_cache_ttl()));
    }

    #[test]
    fn test_unrepresentable_age_is_stale() {
        let now = Utc::now();
        let check = InstallCheck {
            timestamp: i64::MIN,
            installed: true,
        };
        assert_eq!(check.age(now), None);
        assert!(check.is_stale(now, default_cache_ttl()));
    }

    #[test]
    fn test_float_timestamp_is_rejected() {
        assert!(serde_json::from_str::<InstallCheck>(r#"{"timestamp":1.5,"installed":true}"#)
            .is_err());
    }
}
