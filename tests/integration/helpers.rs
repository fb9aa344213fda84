//! Shared test helpers for integration tests.

use std::sync::Arc;

use tempfile::TempDir;

use mailgate_auth::{
    CredentialCipher, EncryptionKey, RequestAuthorizer, SecretStore, SessionManager, SessionStore,
    TokenCodec,
};
use mailgate_core::config::{AppConfig, StorageProvider};

/// Test application context wired the way the daemon wires it
pub struct TestApp {
    /// Holds the secret file and sessions directory
    pub dir: TempDir,
    /// Application config pointing into `dir`
    pub config: AppConfig,
    /// Bearer secret check
    pub authorizer: RequestAuthorizer,
    /// Token codec
    pub codec: Arc<TokenCodec>,
    /// Session records
    pub sessions: Arc<SessionStore>,
    /// Login / resolve / logout flow
    pub manager: SessionManager,
}

impl TestApp {
    /// Create a new test application with the given shared secret
    pub async fn with_secret(secret: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.auth.secret_file = dir
            .path()
            .join("auth_secret.txt")
            .to_string_lossy()
            .to_string();
        config.storage.provider = StorageProvider::Local;
        config.storage.sessions_dir = dir.path().join("sessions").to_string_lossy().to_string();

        std::fs::write(&config.auth.secret_file, format!("{secret}\n"))
            .expect("Failed to write secret");

        Self::from_config(dir, config).await
    }

    /// Create a new test application with a fixed secret
    pub async fn new() -> Self {
        Self::with_secret("integration-secret").await
    }

    /// Build every component from `config`
    pub async fn from_config(dir: TempDir, config: AppConfig) -> Self {
        let secret = SecretStore::from_config(&config.auth)
            .load()
            .await
            .expect("Failed to load secret");
        let records = mailgate_storage::build_record_store(&config.storage)
            .await
            .expect("Failed to init record store");

        let cipher = CredentialCipher::new(&EncryptionKey::derive(&secret));
        let codec = Arc::new(TokenCodec::new(secret.clone(), &config.session));
        let sessions = Arc::new(SessionStore::new(records, cipher, &config.session));
        let manager = SessionManager::new(Arc::clone(&codec), Arc::clone(&sessions));
        let authorizer = RequestAuthorizer::new(secret, &config.auth);

        Self {
            dir,
            config,
            authorizer,
            codec,
            sessions,
            manager,
        }
    }

    /// Re-open the same directories, as a restarted process would
    pub async fn restart(self) -> Self {
        Self::from_config(self.dir, self.config).await
    }

    /// Names of the files in the sessions directory
    pub fn session_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.storage.sessions_dir)
            .expect("Failed to list sessions dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
