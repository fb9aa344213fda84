//! Encrypted credential records keyed by `sha256(token)`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use mailgate_core::config::SessionConfig;
use mailgate_core::result::AppResult;
use mailgate_core::traits::RecordStore;
use mailgate_core::types::{CredentialRecord, RecordKey};

use super::locks::KeyLocks;
use crate::cipher::CredentialCipher;

/// A plaintext mail account credential pair.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    /// Mail account address.
    pub email: String,
    /// Mail account password.
    pub password: Zeroizing<String>,
}

impl MailCredentials {
    /// Create a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

/// A decrypted session record.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    /// The decrypted credential pair.
    pub credentials: MailCredentials,
    /// When the session was created (epoch seconds).
    pub created: i64,
    /// When the session was last read, including this read (epoch seconds).
    pub last_access: i64,
}

/// Administrative view of a record. Never carries the password.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Storage key (hex SHA-256 of the token).
    pub key: RecordKey,
    /// Mail account address.
    pub email: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last access time.
    pub last_access: DateTime<Utc>,
}

/// Creates, reads, deletes and expires credential records.
///
/// The backing store is read fresh on every call. Operations on the same
/// record are serialized in-process; different records never contend.
pub struct SessionStore {
    records: Arc<dyn RecordStore>,
    cipher: CredentialCipher,
    /// Seconds without access after which a record is purged.
    idle_timeout_seconds: i64,
    locks: KeyLocks,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("provider", &self.records.provider_type())
            .field("idle_timeout_seconds", &self.idle_timeout_seconds)
            .finish()
    }
}

impl SessionStore {
    /// Create a session store over `records`.
    pub fn new(
        records: Arc<dyn RecordStore>,
        cipher: CredentialCipher,
        config: &SessionConfig,
    ) -> Self {
        Self {
            records,
            cipher,
            idle_timeout_seconds: config.idle_timeout_seconds(),
            locks: KeyLocks::default(),
        }
    }

    /// Seconds without access after which a record is purged.
    pub fn idle_timeout_seconds(&self) -> i64 {
        self.idle_timeout_seconds
    }

    /// Store `password` for `token`, replacing any existing record.
    pub async fn create(&self, token: &str, email: &str, password: &str) -> AppResult<()> {
        self.create_at(token, email, password, Utc::now().timestamp())
            .await
    }

    /// [`SessionStore::create`] with an explicit clock.
    pub async fn create_at(
        &self,
        token: &str,
        email: &str,
        password: &str,
        now: i64,
    ) -> AppResult<()> {
        let key = RecordKey::for_token(token);
        let ciphertext = self.cipher.encrypt(password)?;
        let record = CredentialRecord::new(email, ciphertext, now);

        let _guard = self.locks.lock(&key).await;
        self.records.put(&key, &record).await?;

        debug!(key = key.short(), "Created session record");
        Ok(())
    }

    /// Read the credentials for `token`, refreshing its last access time.
    ///
    /// The refreshed record is persisted before decryption, so a read that
    /// fails to decrypt still counts as activity.
    pub async fn get(&self, token: &str) -> AppResult<Option<SessionCredentials>> {
        self.get_at(token, Utc::now().timestamp()).await
    }

    /// [`SessionStore::get`] with an explicit clock.
    pub async fn get_at(&self, token: &str, now: i64) -> AppResult<Option<SessionCredentials>> {
        let key = RecordKey::for_token(token);
        let _guard = self.locks.lock(&key).await;

        let Some(mut record) = self.records.get(&key).await? else {
            return Ok(None);
        };

        record.touch(now);
        self.records.put(&key, &record).await?;

        let password = self.cipher.decrypt(&record.password).inspect_err(|e| {
            warn!(key = key.short(), error = %e, "Failed to decrypt session record");
        })?;

        Ok(Some(SessionCredentials {
            credentials: MailCredentials {
                email: record.email,
                password,
            },
            created: record.created,
            last_access: record.last_access,
        }))
    }

    /// Remove the record for `token`. Returns whether one existed.
    pub async fn delete(&self, token: &str) -> AppResult<bool> {
        let key = RecordKey::for_token(token);
        let _guard = self.locks.lock(&key).await;

        let removed = self.records.delete(&key).await?;
        if removed {
            debug!(key = key.short(), "Deleted session record");
        }
        Ok(removed)
    }

    /// Remove every record idle for longer than the idle timeout.
    pub async fn sweep_expired(&self) -> AppResult<usize> {
        self.sweep_expired_at(Utc::now().timestamp()).await
    }

    /// [`SessionStore::sweep_expired`] with an explicit clock.
    ///
    /// Each candidate is re-read under its lock and re-checked immediately
    /// before deletion. A record that cannot be read or deleted is logged
    /// and skipped.
    pub async fn sweep_expired_at(&self, now: i64) -> AppResult<usize> {
        let keys = self.records.list_all().await?;
        let mut removed = 0usize;

        for key in &keys {
            match self.records.get(key).await {
                Ok(Some(record)) if record.is_idle(now, self.idle_timeout_seconds) => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(key = key.short(), error = %e, "Skipping unreadable session record");
                    continue;
                }
            }

            match self.remove_if_idle(key, now).await {
                Ok(true) => removed += 1,
                Ok(false) => {
                    debug!(key = key.short(), "Session record refreshed during sweep, kept");
                }
                Err(e) => {
                    warn!(key = key.short(), error = %e, "Failed to remove expired session record");
                }
            }
        }

        info!(scanned = keys.len(), removed = removed, "Session sweep completed");
        Ok(removed)
    }

    async fn remove_if_idle(&self, key: &RecordKey, now: i64) -> AppResult<bool> {
        let _guard = self.locks.lock(key).await;
        match self.records.get(key).await? {
            Some(record) if record.is_idle(now, self.idle_timeout_seconds) => {
                self.records.delete(key).await
            }
            _ => Ok(false),
        }
    }

    /// Number of stored records.
    pub async fn count(&self) -> AppResult<usize> {
        Ok(self.records.list_all().await?.len())
    }

    /// Summaries of all readable records, oldest access first.
    pub async fn list(&self) -> AppResult<Vec<SessionSummary>> {
        let mut summaries = Vec::new();
        for key in self.records.list_all().await? {
            match self.records.get(&key).await {
                Ok(Some(record)) => summaries.push(SessionSummary {
                    created: record.created_at(),
                    last_access: record.last_access_at(),
                    email: record.email,
                    key,
                }),
                Ok(None) => {}
                Err(e) => warn!(key = key.short(), error = %e, "Skipping unreadable session record"),
            }
        }
        summaries.sort_by_key(|s| s.last_access);
        Ok(summaries)
    }
}
