//! The shared secret: loaded once at startup, immutable afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use zeroize::Zeroizing;

use mailgate_core::config::AuthConfig;
use mailgate_core::error::{AppError, ErrorKind};
use mailgate_core::result::AppResult;

/// Number of random bytes in a generated secret (hex-encoded on disk).
const GENERATED_SECRET_BYTES: usize = 32;

/// The pre-provisioned value that proves a caller is an authorized API client.
///
/// Also keys session token signatures and, through
/// [`EncryptionKey::derive`](crate::cipher::EncryptionKey::derive), stored
/// credential encryption. The bytes are wiped on drop and never printed.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wrap raw secret bytes. Empty secrets are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> AppResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AppError::configuration("Auth secret is empty"));
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    /// The raw secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(**redacted**)")
    }
}

/// Reads the shared secret from its file.
#[derive(Debug, Clone)]
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    /// Create a store for the secret file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for the secret file named in the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret_file)
    }

    /// Path of the secret file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the secret.
    ///
    /// Fails with a configuration error if the file is missing or holds only
    /// whitespace. Surrounding whitespace is not part of the secret.
    pub async fn load(&self) -> AppResult<SharedSecret> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => Zeroizing::new(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::configuration(format!(
                    "Auth secret file not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to read auth secret file: {}", self.path.display()),
                    e,
                ));
            }
        };

        self.warn_if_exposed().await;
        SharedSecret::new(trim_secret(&raw))
    }

    /// Write a freshly generated random secret and return it.
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub async fn generate(&self, overwrite: bool) -> AppResult<SharedSecret> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(0o700);
            builder.create(parent).await?;
        }

        let mut bytes = Zeroizing::new([0u8; GENERATED_SECRET_BYTES]);
        OsRng.fill_bytes(bytes.as_mut());
        let encoded = Zeroizing::new(hex::encode(bytes.as_ref()));

        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = match options.open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AppError::validation(format!(
                    "Auth secret file already exists: {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(encoded.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        info!(path = %self.path.display(), "Generated new auth secret");
        SharedSecret::new(encoded.as_bytes().to_vec())
    }

    #[cfg(unix)]
    async fn warn_if_exposed(&self) {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(meta) = fs::metadata(&self.path).await {
            let mode = meta.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                warn!(
                    path = %self.path.display(),
                    mode = format!("{mode:o}"),
                    "Auth secret file is readable by other users"
                );
            }
        }
    }

    #[cfg(not(unix))]
    async fn warn_if_exposed(&self) {}
}

/// Strip leading and trailing whitespace and NUL bytes.
fn trim_secret(raw: &[u8]) -> Vec<u8> {
    let is_pad = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\0' | 0x0b);
    let start = raw.iter().position(|b| !is_pad(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_pad(b)).map_or(start, |i| i + 1);
    raw[start..end].to_vec()
}
