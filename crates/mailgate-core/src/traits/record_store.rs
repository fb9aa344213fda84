//! Key-value seam between session expiry logic and the bytes on disk.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::record::{CredentialRecord, RecordKey};

/// Trait for credential record backends.
///
/// Implementations exist for the local filesystem (one file per record)
/// and for an in-process map. Writes replace the whole record; the last
/// writer wins.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Store `record` under `key`, replacing any existing record.
    async fn put(&self, key: &RecordKey, record: &CredentialRecord) -> AppResult<()>;

    /// Fetch the record under `key`, or `None` if there is none.
    async fn get(&self, key: &RecordKey) -> AppResult<Option<CredentialRecord>>;

    /// Remove the record under `key`. Returns `true` if a record was removed.
    async fn delete(&self, key: &RecordKey) -> AppResult<bool>;

    /// List the keys of all stored records.
    async fn list_all(&self) -> AppResult<Vec<RecordKey>>;

    /// Check whether the backend is usable.
    async fn health_check(&self) -> AppResult<bool>;
}
