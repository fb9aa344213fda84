//! Encryption key derivation.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::secret::SharedSecret;

/// Suffix hashed after the shared secret to derive the encryption key.
const KEY_SALT: &[u8] = b"encryption_salt";

/// Size of an AES-256 key.
pub const KEY_SIZE: usize = 32;

/// AES-256 key derived from the shared secret. Never persisted.
#[derive(Clone)]
pub struct EncryptionKey(Zeroizing<[u8; KEY_SIZE]>);

impl EncryptionKey {
    /// `sha256(secret || "encryption_salt")`.
    pub fn derive(secret: &SharedSecret) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.expose());
        hasher.update(KEY_SALT);
        Self(Zeroizing::new(hasher.finalize().into()))
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(**redacted**)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_matches_salted_sha256() {
        let secret = SharedSecret::new("s3cret").unwrap();
        let expected: [u8; KEY_SIZE] = Sha256::digest(b"s3cretencryption_salt").into();
        assert_eq!(EncryptionKey::derive(&secret).as_bytes(), &expected);
    }

    #[test]
    fn test_derive_is_deterministic_per_secret() {
        let a = SharedSecret::new("one").unwrap();
        let b = SharedSecret::new("two").unwrap();
        assert_eq!(
            EncryptionKey::derive(&a).as_bytes(),
            EncryptionKey::derive(&a).as_bytes()
        );
        assert_ne!(
            EncryptionKey::derive(&a).as_bytes(),
            EncryptionKey::derive(&b).as_bytes()
        );
    }
}
