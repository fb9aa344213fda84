//! Configuration inspection CLI commands.

use clap::{Args, Subcommand};

use mailgate_core::config::AppConfig;
use mailgate_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (never the secret itself)
    Show,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Table => {
                output::print_kv("Secret file", &config.auth.secret_file);
                output::print_kv("Health endpoint", &config.auth.health_endpoint);
                output::print_kv(
                    "Token max age",
                    &format!("{} days", config.session.token_max_age_days),
                );
                output::print_kv(
                    "Idle timeout",
                    &format!("{} days", config.session.idle_timeout_days),
                );
                output::print_kv(
                    "Cleanup",
                    &if config.session.cleanup_enabled {
                        format!("every {} min", config.session.cleanup_interval_minutes)
                    } else {
                        "disabled".to_string()
                    },
                );
                output::print_kv("Storage", &config.storage.provider.to_string());
                output::print_kv("Sessions dir", &config.storage.sessions_dir);
                output::print_kv("Log level", &config.logging.level);
                output::print_kv("Log format", &config.logging.format);
            }
            OutputFormat::Json => output::print_item(config, format),
        },
    }

    Ok(())
}
