//! Central configuration for the session-auth crate

use chrono::Duration;
use std::{env, sync::LazyLock};

const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;
const DEFAULT_SESSION_RENEWAL_WINDOW_SECS: i64 = 60 * 60 * 24 * 15;
/// Longest lifetime accepted from the environment: 100 years
const MAX_CONFIGURED_SECS: i64 = 60 * 60 * 24 * 365 * 100;

/// Lifetime of a freshly created or renewed session, in seconds.
/// Default: 30 days
pub(crate) static SESSION_MAX_AGE: LazyLock<i64> = LazyLock::new(|| {
    parse_seconds(
        env::var("SESSION_MAX_AGE").ok().as_deref(),
        DEFAULT_SESSION_MAX_AGE_SECS,
    )
});

/// Remaining lifetime below which a validated session is slid forward, in seconds.
/// Default: 15 days
pub(crate) static SESSION_RENEWAL_WINDOW: LazyLock<i64> = LazyLock::new(|| {
    parse_seconds(
        env::var("SESSION_RENEWAL_WINDOW").ok().as_deref(),
        DEFAULT_SESSION_RENEWAL_WINDOW_SECS,
    )
});

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| table_prefix_from(env::var("DB_TABLE_PREFIX").ok().as_deref()));

/// Sessions table name
pub(crate) static DB_TABLE_SESSIONS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_SESSIONS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "sessions"))
});

/// Users table name. The table is owned by the application; only its `id` column is read.
pub(crate) static DB_TABLE_USERS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_USERS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "users"))
});

fn table_prefix_from(value: Option<&str>) -> String {
    value.unwrap_or("sa_").to_string()
}

fn parse_seconds(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|secs| (1..=MAX_CONFIGURED_SECS).contains(secs))
        .unwrap_or(default)
}

fn seconds_or(secs: i64, default: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or_else(|| Duration::seconds(default))
}

/// Expiry policy applied by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a session lives after creation or renewal.
    pub max_age: Duration,
    /// A session read with less than this much time left gets renewed.
    pub renewal_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECS),
            renewal_window: Duration::seconds(DEFAULT_SESSION_RENEWAL_WINDOW_SECS),
        }
    }
}

impl SessionConfig {
    pub fn new(max_age: Duration, renewal_window: Duration) -> Self {
        Self {
            max_age,
            // A window wider than the lifetime would renew on every read
            renewal_window: renewal_window.min(max_age),
        }
    }

    /// Build the policy from `SESSION_MAX_AGE` and `SESSION_RENEWAL_WINDOW`.
    pub fn from_env() -> Self {
        Self::new(
            seconds_or(*SESSION_MAX_AGE, DEFAULT_SESSION_MAX_AGE_SECS),
            seconds_or(*SESSION_RENEWAL_WINDOW, DEFAULT_SESSION_RENEWAL_WINDOW_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_policy_is_thirty_and_fifteen_days() {
        let config = SessionConfig::default();
        assert_eq!(config.max_age, Duration::days(30));
        assert_eq!(config.renewal_window, Duration::days(15));
    }

    #[test]
    fn test_new_clamps_renewal_window_to_max_age() {
        // Given a renewal window longer than the session lifetime
        let config = SessionConfig::new(Duration::days(1), Duration::days(7));

        // Then the window is clamped
        assert_eq!(config.renewal_window, Duration::days(1));
        assert_eq!(config.max_age, Duration::days(1));
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds(None, 42), 42);
        assert_eq!(parse_seconds(Some("3600"), 42), 3600);
        assert_eq!(parse_seconds(Some("invalid"), 42), 42);
        assert_eq!(parse_seconds(Some("0"), 42), 42);
        assert_eq!(parse_seconds(Some("-5"), 42), 42);
    }

    #[test]
    fn test_parse_seconds_rejects_out_of_range_lifetimes() {
        assert_eq!(parse_seconds(Some("9223372036854775807"), 42), 42);
        assert_eq!(parse_seconds(Some("10000000000000"), 42), 42);
        assert_eq!(
            parse_seconds(Some(&MAX_CONFIGURED_SECS.to_string()), 42),
            MAX_CONFIGURED_SECS
        );
    }

    #[test]
    fn test_seconds_or_falls_back_when_out_of_bounds() {
        assert_eq!(seconds_or(i64::MAX, 60), Duration::seconds(60));
        assert_eq!(seconds_or(120, 60), Duration::seconds(120));
    }

    #[test]
    #[serial]
    fn test_from_env_with_huge_max_age_uses_default() {
        let original = env::var("SESSION_MAX_AGE").ok();
        unsafe {
            env::set_var("SESSION_MAX_AGE", "9223372036854775807");
        }

        // The static may already be initialized by another test; either way no panic
        let config = SessionConfig::from_env();
        assert!(config.max_age <= Duration::seconds(MAX_CONFIGURED_SECS));
        assert!(config.renewal_window <= config.max_age);

        unsafe {
            match original {
                Some(value) => env::set_var("SESSION_MAX_AGE", value),
                None => env::remove_var("SESSION_MAX_AGE"),
            }
        }
    }

    #[test]
    fn test_table_prefix_from() {
        assert_eq!(table_prefix_from(None), "sa_");
        assert_eq!(table_prefix_from(Some("app_")), "app_");
    }

    #[test]
    fn test_table_names_share_prefix() {
        assert!(DB_TABLE_SESSIONS.ends_with("sessions"));
        assert!(DB_TABLE_USERS.ends_with("users"));
    }
}
