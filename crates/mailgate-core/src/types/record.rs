//! The persisted credential record and the key it is stored under.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Storage key of a credential record: lowercase hex SHA-256 of the session token.
///
/// The hash is one-way, so a key (and the file name derived from it) never
/// reveals the token it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey(String);

impl RecordKey {
    /// Length of a hex-encoded SHA-256 digest.
    pub const LEN: usize = 64;

    /// Derive the key for a session token.
    pub fn for_token(token: &str) -> Self {
        Self(hex::encode(Sha256::digest(token.as_bytes())))
    }

    /// Parse a key previously produced by [`RecordKey::for_token`].
    ///
    /// Anything other than 64 lowercase hex characters is rejected, which
    /// keeps keys safe to use as file names.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let valid = value.len() == Self::LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::validation("Invalid record key"))
        }
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix used in logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.0
    }
}

/// A stored session: the mail account and its encrypted password.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Mail account address.
    pub email: String,
    /// Encrypted password blob (base64).
    pub password: String,
    /// When the session was created.
    pub created: i64,
    /// When the session was last read.
    pub last_access: i64,
}

impl CredentialRecord {
    /// Create a fresh record with both timestamps set to `now`.
    pub fn new(email: impl Into<String>, password_ciphertext: impl Into<String>, now: i64) -> Self {
        Self {
            email: email.into(),
            password: password_ciphertext.into(),
            created: now,
            last_access: now,
        }
    }

    /// Record an access at `now`. `last_access` never moves backwards.
    pub fn touch(&mut self, now: i64) {
        self.last_access = self.last_access.max(now);
    }

    /// Whether the record has been idle for longer than `idle_timeout_seconds`.
    pub fn is_idle(&self, now: i64, idle_timeout_seconds: i64) -> bool {
        now.saturating_sub(self.last_access) > idle_timeout_seconds
    }

    /// Creation time as a `DateTime<Utc>`.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created, 0).unwrap_or_default()
    }

    /// Last access time as a `DateTime<Utc>`.
    pub fn last_access_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.last_access, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_sha256_hex() {
        let key = RecordKey::for_token("abc");
        assert_eq!(
            key.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(key.short(), "ba7816bf8f01");
    }

    #[test]
    fn test_key_parse_rejects_path_like_values() {
        assert!(RecordKey::parse("../../etc/passwd").is_err());
        assert!(RecordKey::parse(&"A".repeat(64)).is_err());
        assert!(RecordKey::parse(&"a".repeat(63)).is_err());
        assert!(RecordKey::parse(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut record = CredentialRecord::new("a@x.com", "blob", 1_000);
        record.touch(2_000);
        assert_eq!(record.last_access, 2_000);
        record.touch(1_500);
        assert_eq!(record.last_access, 2_000);
        assert_eq!(record.created, 1_000);
    }

    #[test]
    fn test_idle_boundary() {
        let record = CredentialRecord::new("a@x.com", "blob", 0);
        assert!(!record.is_idle(100, 100));
        assert!(record.is_idle(101, 100));
    }

    #[test]
    fn test_record_json_field_names() {
        let record = CredentialRecord::new("a@x.com", "blob", 42);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["password"], "blob");
        assert_eq!(json["created"], 42);
        assert_eq!(json["last_access"], 42);
    }
}
