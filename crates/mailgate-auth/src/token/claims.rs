//! Session token payload.

use serde::{Deserialize, Serialize};

/// Payload carried inside a session token.
///
/// Tokens are not encrypted: anyone holding one can read the email and
/// issuance time. Only the signature is secret-dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Mail account the token was issued for.
    pub email: String,
    /// Issuance time, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Random hex nonce making tokens issued in the same second distinct.
    #[serde(default)]
    pub random: String,
}

impl TokenPayload {
    /// Age of the token at `now`, in seconds.
    pub fn age_at(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }
}
