//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Shared-secret configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path to the file holding the shared secret.
    ///
    /// The file is read once at startup; its trimmed contents must not be empty.
    #[serde(default = "default_secret_file")]
    pub secret_file: String,
    /// Endpoint name that bypasses bearer authorization.
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_file: default_secret_file(),
            health_endpoint: default_health_endpoint(),
        }
    }
}

fn default_secret_file() -> String {
    "./config/auth_secret.txt".to_string()
}

fn default_health_endpoint() -> String {
    "health".to_string()
}
