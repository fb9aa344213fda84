//! Local filesystem record store: one `<key>.session` JSON file per record.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use mailgate_core::error::{AppError, ErrorKind};
use mailgate_core::result::AppResult;
use mailgate_core::traits::RecordStore;
use mailgate_core::types::{CredentialRecord, RecordKey};

/// File extension of record files.
const RECORD_EXTENSION: &str = "session";

/// Distinguishes concurrent temp files written by this process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Filesystem-backed record store.
///
/// The directory is created owner-only (0700) and every record file is
/// owner read/write only (0600). Writes go to a temp file in the same
/// directory and are renamed over the target, so readers always see a
/// whole record.
#[derive(Debug, Clone)]
pub struct LocalRecordStore {
    /// Directory holding the record files.
    root: PathBuf,
}

impl LocalRecordStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create sessions directory: {}", root.display()),
                e,
            )
        })?;
        restrict_permissions(&root, 0o700).await?;
        Ok(Self { root })
    }

    /// Directory holding the record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the record for `key`.
    pub fn record_path(&self, key: &RecordKey) -> PathBuf {
        self.root.join(format!("{key}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self, key: &RecordKey) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{key}.{}.{n}.tmp", std::process::id()))
    }
}

#[async_trait]
impl RecordStore for LocalRecordStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn put(&self, key: &RecordKey, record: &CredentialRecord) -> AppResult<()> {
        let json = serde_json::to_vec(record)?;
        let temp = self.temp_path(key);
        let target = self.record_path(key);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create record file", e)
        })?;

        let staged = async {
            let written = async {
                file.write_all(&json).await?;
                file.flush().await?;
                file.sync_all().await
            }
            .await;
            drop(file);
            written.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write record file", e)
            })?;

            restrict_permissions(&temp, 0o600).await?;

            fs::rename(&temp, &target).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to replace record file", e)
            })
        }
        .await;

        // A failed write never leaves its temp file behind.
        if let Err(e) = staged {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        debug!(key = key.short(), bytes = json.len(), "Wrote record");
        Ok(())
    }

    async fn get(&self, key: &RecordKey) -> AppResult<Option<CredentialRecord>> {
        let path = self.record_path(key);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to read record file",
                    e,
                ));
            }
        };

        let record = serde_json::from_slice(&contents)?;
        Ok(Some(record))
    }

    async fn delete(&self, key: &RecordKey) -> AppResult<bool> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => {
                debug!(key = key.short(), "Deleted record");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to delete record file",
                e,
            )),
        }
    }

    async fn list_all(&self) -> AppResult<Vec<RecordKey>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to list sessions directory",
                    e,
                ));
            }
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(&format!(".{RECORD_EXTENSION}")) else {
                continue;
            };
            match RecordKey::parse(stem) {
                Ok(key) => keys.push(key),
                Err(_) => warn!(file = name, "Ignoring unexpected file in sessions directory"),
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path, mode: u32) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to set permissions on {}", path.display()),
                e,
            )
        })
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path, _mode: u32) -> AppResult<()> {
    Ok(())
}
