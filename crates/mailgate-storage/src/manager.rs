//! Builds the configured record store.

use std::sync::Arc;

use tracing::info;

use mailgate_core::config::{StorageConfig, StorageProvider};
use mailgate_core::result::AppResult;
use mailgate_core::traits::RecordStore;

use crate::providers::{LocalRecordStore, MemoryRecordStore};

/// Create the record store selected by `config.provider`.
pub async fn build_record_store(config: &StorageConfig) -> AppResult<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.provider {
        StorageProvider::Local => Arc::new(LocalRecordStore::new(&config.sessions_dir).await?),
        StorageProvider::Memory => Arc::new(MemoryRecordStore::new()),
    };

    info!(provider = store.provider_type(), "Record store initialized");
    Ok(store)
}
