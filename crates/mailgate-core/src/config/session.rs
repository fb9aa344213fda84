//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session token and credential record lifetime configuration.
///
/// Token age and record idleness are measured on separate clocks: a token
/// expires a fixed time after issuance even while in use, and a record is
/// purged once it has not been read for the idle timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum age of a session token in days, measured from issuance.
    #[serde(default = "default_token_max_age")]
    pub token_max_age_days: u64,
    /// Days without access after which a credential record is purged.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_days: u64,
    /// Whether the daemon runs the periodic expiry sweep.
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
    /// Interval between expiry sweeps in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl SessionConfig {
    /// Token max age in seconds.
    pub fn token_max_age_seconds(&self) -> i64 {
        days_to_seconds(self.token_max_age_days)
    }

    /// Record idle timeout in seconds.
    pub fn idle_timeout_seconds(&self) -> i64 {
        days_to_seconds(self.idle_timeout_days)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_max_age_days: default_token_max_age(),
            idle_timeout_days: default_idle_timeout(),
            cleanup_enabled: true,
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn days_to_seconds(days: u64) -> i64 {
    i64::try_from(days)
        .unwrap_or(i64::MAX)
        .saturating_mul(24 * 60 * 60)
}

fn default_token_max_age() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_thirty_days() {
        let config = SessionConfig::default();
        assert_eq!(config.token_max_age_seconds(), 30 * 24 * 3600);
        assert_eq!(config.idle_timeout_seconds(), 30 * 24 * 3600);
    }

    #[test]
    fn test_huge_values_saturate() {
        let config = SessionConfig {
            token_max_age_days: u64::MAX,
            ..SessionConfig::default()
        };
        assert_eq!(config.token_max_age_seconds(), i64::MAX);
    }
}
