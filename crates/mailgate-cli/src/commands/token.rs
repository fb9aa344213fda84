//! Session token CLI commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use mailgate_auth::{INVALID_TOKEN, TokenCodec};
use mailgate_core::config::AppConfig;
use mailgate_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a session token for an email (does not store credentials)
    Issue {
        /// Mail account address
        email: String,
    },
    /// Verify a session token and show its payload
    Verify {
        /// Session token
        token: String,
    },
}

/// Verified token details
#[derive(Debug, Serialize)]
struct TokenInfo {
    /// Mail account address
    email: String,
    /// Issuance time
    issued: DateTime<Utc>,
    /// Time after which the token is rejected
    expires: DateTime<Utc>,
}

/// Execute token commands
pub async fn execute(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let secret = super::load_secret(config).await?;
    let codec = TokenCodec::new(secret, &config.session);

    match &args.command {
        TokenCommand::Issue { email } => {
            let token = codec.issue(email)?;
            match format {
                OutputFormat::Table => println!("{token}"),
                OutputFormat::Json => {
                    output::print_item(&serde_json::json!({ "token": token }), format)
                }
            }
        }
        TokenCommand::Verify { token } => {
            let payload = codec
                .decode_at(token, Utc::now().timestamp())
                .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

            let info = TokenInfo {
                email: payload.email,
                issued: DateTime::from_timestamp(payload.timestamp, 0).unwrap_or_default(),
                expires: DateTime::from_timestamp(
                    payload.timestamp.saturating_add(codec.max_age_seconds()),
                    0,
                )
                .unwrap_or_default(),
            };

            match format {
                OutputFormat::Table => {
                    output::print_success("Token is valid");
                    output::print_kv("Email", &info.email);
                    output::print_kv("Issued", &info.issued.to_rfc3339());
                    output::print_kv("Expires", &info.expires.to_rfc3339());
                }
                OutputFormat::Json => output::print_item(&info, format),
            }
        }
    }

    Ok(())
}
