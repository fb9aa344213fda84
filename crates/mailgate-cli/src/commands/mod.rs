//! CLI command definitions and dispatch.

pub mod config;
pub mod secret;
pub mod session;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use mailgate_auth::{CredentialCipher, EncryptionKey, SecretStore, SessionStore, SharedSecret};
use mailgate_core::config::AppConfig;
use mailgate_core::error::AppError;

use crate::output::OutputFormat;

/// Mailgate — shared-secret API authorization and mail credential sessions
#[derive(Debug, Parser)]
#[command(name = "mailgate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Shared secret management
    Secret(secret::SecretArgs),
    /// Session token issuance and inspection
    Token(token::TokenArgs),
    /// Stored session management
    Session(session::SessionArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;

        match &self.command {
            Commands::Secret(args) => secret::execute(args, &config).await,
            Commands::Token(args) => token::execute(args, &config, self.format).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load the shared secret named in the configuration
pub async fn load_secret(config: &AppConfig) -> Result<SharedSecret, AppError> {
    SecretStore::from_config(&config.auth).load().await
}

/// Helper: open the session store described by the configuration
pub async fn open_sessions(config: &AppConfig) -> Result<Arc<SessionStore>, AppError> {
    let secret = load_secret(config).await?;
    let records = mailgate_storage::build_record_store(&config.storage).await?;
    debug!(provider = records.provider_type(), "Opened record store");

    let cipher = CredentialCipher::new(&EncryptionKey::derive(&secret));
    Ok(Arc::new(SessionStore::new(records, cipher, &config.session)))
}
