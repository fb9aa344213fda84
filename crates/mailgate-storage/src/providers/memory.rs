//! In-memory record store using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use mailgate_core::result::AppResult;
use mailgate_core::traits::RecordStore;
use mailgate_core::types::{CredentialRecord, RecordKey};

/// Process-local record store. Contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<DashMap<RecordKey, CredentialRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &RecordKey, record: &CredentialRecord) -> AppResult<()> {
        self.records.insert(key.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, key: &RecordKey) -> AppResult<Option<CredentialRecord>> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &RecordKey) -> AppResult<bool> {
        Ok(self.records.remove(key).is_some())
    }

    async fn list_all(&self) -> AppResult<Vec<RecordKey>> {
        let mut keys: Vec<RecordKey> = self.records.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
