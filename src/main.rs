//! Mailgate daemon.
//!
//! Loads the configuration and shared secret, opens the session record
//! store, and keeps idle sessions swept until shut down.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use mailgate_auth::{CredentialCipher, EncryptionKey, SecretStore, SessionCleanup, SessionStore};
use mailgate_core::config::AppConfig;
use mailgate_core::error::{AppError, ErrorKind};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Mailgate stopped with an error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("MAILGATE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("MAILGATE_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Mailgate");

    // ── Step 1: Shared secret (fatal if missing) ─────────────────
    let secret = SecretStore::from_config(&config.auth).load().await?;
    tracing::info!(path = %config.auth.secret_file, "Auth secret loaded");

    // ── Step 2: Record store ─────────────────────────────────────
    let records = mailgate_storage::build_record_store(&config.storage).await?;
    if !records.health_check().await? {
        return Err(AppError::storage(format!(
            "Record store '{}' is not usable",
            records.provider_type()
        )));
    }

    // ── Step 3: Session store ────────────────────────────────────
    let cipher = CredentialCipher::new(&EncryptionKey::derive(&secret));
    let sessions = Arc::new(SessionStore::new(records, cipher, &config.session));
    tracing::info!(
        stored = sessions.count().await?,
        token_max_age_days = config.session.token_max_age_days,
        idle_timeout_days = config.session.idle_timeout_days,
        "Session store ready"
    );

    // ── Step 4: Background cleanup ───────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let cleanup_handle = if config.session.cleanup_enabled {
        let cleanup = SessionCleanup::new(Arc::clone(&sessions), &config.session);
        Some(tokio::spawn(async move { cleanup.run(shutdown_rx).await }))
    } else {
        tracing::warn!("Session cleanup disabled; idle records are kept until swept manually");
        None
    };

    // ── Step 5: Wait for shutdown ────────────────────────────────
    shutdown_signal().await?;
    tracing::info!("Shutdown signal received, stopping...");

    let _ = shutdown_tx.send(true);
    if let Some(handle) = cleanup_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Session cleanup task panicked");
        }
    }

    tracing::info!("Mailgate stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() -> Result<(), AppError> {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                "Failed to install Ctrl+C handler",
                e,
            )
        })
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).map_err(
                |e| {
                    AppError::with_source(
                        ErrorKind::Internal,
                        "Failed to install SIGTERM handler",
                        e,
                    )
                },
            )?;
        signal.recv().await;
        Ok::<(), AppError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), AppError>>();

    tokio::select! {
        result = ctrl_c => result,
        result = terminate => result,
    }
}
