//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a missing file still
//! yields a usable configuration.

pub mod auth;
pub mod logging;
pub mod session;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;
pub use self::storage::{StorageConfig, StorageProvider};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
///
/// `MAILGATE__SESSION__IDLE_TIMEOUT_DAYS=7` overrides `session.idle_timeout_days`.
pub const ENV_PREFIX: &str = "MAILGATE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared-secret settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Token and record lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Record storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base file at `path`, an optional `config/{env}` overlay,
    /// and environment variables prefixed with `MAILGATE__`. Missing files
    /// are skipped.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load("does/not/exist.toml", "nonexistent-env").unwrap();
        assert_eq!(config.session.token_max_age_days, 30);
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.auth.health_endpoint, "health");
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let dir = std::env::temp_dir().join(format!("mailgate-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("base.toml");
        std::fs::write(
            &path,
            "[session]\nidle_timeout_days = 7\n\n[storage]\nprovider = \"memory\"\n",
        )
        .unwrap();

        let config = AppConfig::load(path.to_str().unwrap(), "nonexistent-env").unwrap();
        assert_eq!(config.session.idle_timeout_days, 7);
        assert_eq!(config.session.token_max_age_days, 30);
        assert_eq!(config.storage.provider, StorageProvider::Memory);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
