//! Shared secret CLI commands.

use clap::{Args, Subcommand};

use mailgate_auth::SecretStore;
use mailgate_core::config::AppConfig;
use mailgate_core::error::AppError;

use crate::output;

/// Arguments for secret commands
#[derive(Debug, Args)]
pub struct SecretArgs {
    /// Secret subcommand
    #[command(subcommand)]
    pub command: SecretCommand,
}

/// Secret subcommands
#[derive(Debug, Subcommand)]
pub enum SecretCommand {
    /// Generate a new random shared secret file
    Generate {
        /// Replace an existing secret without asking
        #[arg(long)]
        force: bool,
    },
    /// Check that the configured secret file loads
    Check,
}

/// Execute secret commands
pub async fn execute(args: &SecretArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = SecretStore::from_config(&config.auth);

    match &args.command {
        SecretCommand::Generate { force } => {
            let exists = tokio::fs::try_exists(store.path()).await.unwrap_or(false);
            let mut overwrite = *force;

            if exists && !overwrite {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Replace {}? Existing sessions and clients stop working.",
                        store.path().display()
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
                overwrite = true;
            }

            store.generate(overwrite).await?;
            output::print_success(&format!(
                "Auth secret written to '{}'",
                store.path().display()
            ));
            if exists {
                output::print_warning("Previously issued tokens and stored sessions are now invalid");
            }
        }
        SecretCommand::Check => {
            store.load().await?;
            output::print_success(&format!(
                "Auth secret '{}' is usable",
                store.path().display()
            ));
        }
    }

    Ok(())
}
