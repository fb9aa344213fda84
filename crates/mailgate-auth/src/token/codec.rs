//! Session token issuance and verification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use mailgate_core::config::SessionConfig;
use mailgate_core::error::AppError;
use mailgate_core::result::AppResult;

use super::claims::TokenPayload;
use crate::secret::SharedSecret;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes in a token's `random` field.
const NONCE_BYTES: usize = 16;

/// The only message a rejected token ever produces.
pub const INVALID_TOKEN: &str = "Invalid or expired session token";

/// Issues and verifies `payload.signature` session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    /// Signing key.
    secret: SharedSecret,
    /// Oldest acceptable token age, in seconds.
    max_age_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec signing with `secret`.
    pub fn new(secret: SharedSecret, config: &SessionConfig) -> Self {
        Self {
            secret,
            max_age_seconds: config.token_max_age_seconds(),
        }
    }

    /// Oldest acceptable token age, in seconds.
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    /// Issue a token for `email` stamped with the current time.
    pub fn issue(&self, email: &str) -> AppResult<String> {
        self.issue_at(email, Utc::now().timestamp())
    }

    /// Issue a token for `email` stamped with `now`.
    pub fn issue_at(&self, email: &str, now: i64) -> AppResult<String> {
        let mut nonce = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut nonce);

        let payload = TokenPayload {
            email: email.to_string(),
            timestamp: now,
            random: hex::encode(nonce),
        };
        let encoded = BASE64.encode(serde_json::to_vec(&payload)?);
        let signature = self.sign(&encoded)?;

        Ok(format!("{encoded}.{signature}"))
    }

    /// Verify `token` against the current time and return its email.
    pub fn verify(&self, token: &str) -> AppResult<String> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify `token` as of `now` and return its email.
    ///
    /// Every failure (shape, signature, encoding, missing fields, age) is the
    /// same `Unauthorized` error so callers cannot tell them apart.
    pub fn verify_at(&self, token: &str, now: i64) -> AppResult<String> {
        self.decode_at(token, now)
            .map(|payload| payload.email)
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))
    }

    /// Verify `token` as of `now` and return the whole payload.
    pub fn decode_at(&self, token: &str, now: i64) -> Option<TokenPayload> {
        let mut parts = token.split('.');
        let (Some(encoded), Some(signature), None) = (parts.next(), parts.next(), parts.next())
        else {
            debug!("Rejected token: malformed");
            return None;
        };

        let expected = self.sign(encoded).ok()?;
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            debug!("Rejected token: bad signature");
            return None;
        }

        let json = BASE64.decode(encoded).ok()?;
        let payload: TokenPayload = serde_json::from_slice(&json).ok()?;

        if payload.age_at(now) > self.max_age_seconds {
            debug!(age = payload.age_at(now), "Rejected token: expired");
            return None;
        }

        Some(payload)
    }

    /// Lowercase hex HMAC-SHA256 of `data`.
    fn sign(&self, data: &str) -> AppResult<String> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.expose())
            .map_err(|_| AppError::internal("Invalid HMAC key length"))?;
        mac.update(data.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
