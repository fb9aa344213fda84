//! AES-256-GCM encryption of credential passwords.
//!
//! Blob format: `base64(nonce[12] || ciphertext || tag[16])`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use mailgate_core::error::AppError;
use mailgate_core::result::AppResult;

use super::key::EncryptionKey;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Encrypts and decrypts stored passwords under a derived key.
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish()
    }
}

impl CredentialCipher {
    /// Create a cipher for `key`.
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| AppError::internal("Credential encryption failed"))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`CredentialCipher::encrypt`].
    ///
    /// Bad encoding, truncation, a wrong key, or any modified byte all fail
    /// with a decryption error.
    pub fn decrypt(&self, blob: &str) -> AppResult<Zeroizing<String>> {
        let raw = BASE64
            .decode(blob)
            .map_err(|_| AppError::decryption("Stored credential is not valid base64"))?;
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(AppError::decryption("Stored credential is truncated"));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(nonce), ciphertext)
                .map_err(|_| AppError::decryption("Stored credential failed authentication"))?,
        );

        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| AppError::decryption("Stored credential is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use mailgate_core::error::ErrorKind;

    use super::*;
    use crate::cipher::key::KEY_SIZE;
    use crate::secret::SharedSecret;

    fn cipher(secret: &str) -> CredentialCipher {
        CredentialCipher::new(&EncryptionKey::derive(&SharedSecret::new(secret).unwrap()))
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher("s3cret");
        let long = "x".repeat(4096);
        for plaintext in ["pw", "", "pässwörd with spaces", long.as_str()] {
            let blob = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&blob).unwrap().as_str(), plaintext);
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = cipher("s3cret");
        let a = cipher.encrypt("pw").unwrap();
        let b = cipher.encrypt("pw").unwrap();
        assert_ne!(a, b);
        let (a, b) = (BASE64.decode(a).unwrap(), BASE64.decode(b).unwrap());
        assert_ne!(&a[..NONCE_SIZE], &b[..NONCE_SIZE]);
    }

    #[test]
    fn test_blob_layout() {
        let blob = cipher("s3cret").encrypt("pw").unwrap();
        assert_eq!(BASE64.decode(blob).unwrap().len(), NONCE_SIZE + 2 + TAG_SIZE);
    }

    #[test]
    fn test_every_modified_byte_is_detected() {
        let cipher = cipher("s3cret");
        let raw = BASE64.decode(cipher.encrypt("password").unwrap()).unwrap();

        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let err = cipher.decrypt(&BASE64.encode(&tampered)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Decryption, "byte {i}");
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let blob = cipher("s3cret").encrypt("pw").unwrap();
        let err = cipher("other").decrypt(&blob).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decryption);
    }

    #[test]
    fn test_raw_keys_are_independent() {
        let mut pattern = [0u8; KEY_SIZE];
        for (i, b) in pattern.iter_mut().enumerate() {
            *b = i as u8;
        }
        let keys = [[0u8; KEY_SIZE], [0xffu8; KEY_SIZE], pattern];
        let ciphers: Vec<CredentialCipher> = keys
            .into_iter()
            .map(|k| CredentialCipher::new(&EncryptionKey::from_bytes(k)))
            .collect();

        for (i, cipher) in ciphers.iter().enumerate() {
            let blob = cipher.encrypt("pw").unwrap();
            assert_eq!(cipher.decrypt(&blob).unwrap().as_str(), "pw");
            for (j, other) in ciphers.iter().enumerate().filter(|(j, _)| *j != i) {
                let err = other.decrypt(&blob).unwrap_err();
                assert_eq!(err.kind, ErrorKind::Decryption, "key {i} decrypted by key {j}");
            }
        }
    }

    #[test]
    fn test_malformed_blobs_fail() {
        let cipher = cipher("s3cret");
        for blob in ["", "not base64!", "AAAA"] {
            let err = cipher.decrypt(blob).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Decryption, "blob {blob:?}");
        }
    }
}
