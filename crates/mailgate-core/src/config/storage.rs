//! Credential record storage configuration.

use serde::{Deserialize, Serialize};

/// Which [`RecordStore`](crate::traits::RecordStore) backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageProvider {
    /// One JSON file per record on the local filesystem.
    #[default]
    Local,
    /// In-process map. Records are lost on restart.
    Memory,
}

impl std::fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::Local => write!(f, "local"),
            StorageProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Record storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default)]
    pub provider: StorageProvider,
    /// Directory holding one `<sha256>.session` file per active session.
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            sessions_dir: default_sessions_dir(),
        }
    }
}

fn default_sessions_dir() -> String {
    "./data/sessions".to_string()
}
