//! Stored session CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use mailgate_auth::{SessionCleanup, SessionSummary};
use mailgate_core::config::AppConfig;
use mailgate_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List stored sessions
    List,
    /// Count stored sessions
    Count,
    /// Remove idle sessions now
    Sweep,
    /// Remove the session for a token
    Revoke {
        /// Session token
        token: String,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Record key prefix
    key: String,
    /// Mail account
    email: String,
    /// Created
    created: String,
    /// Last access
    last_access: String,
}

impl From<&SessionSummary> for SessionRow {
    fn from(s: &SessionSummary) -> Self {
        Self {
            key: s.key.short().to_string(),
            email: s.email.clone(),
            created: s.created.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_access: s.last_access.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let sessions = super::open_sessions(config).await?;

    match &args.command {
        SessionCommand::List => {
            let summaries = sessions.list().await?;
            match format {
                OutputFormat::Table => {
                    let rows: Vec<SessionRow> = summaries.iter().map(SessionRow::from).collect();
                    output::print_list(&rows, format, "No stored sessions.");
                }
                OutputFormat::Json => output::print_item(&summaries, format),
            }
        }
        SessionCommand::Count => {
            let count = sessions.count().await?;
            match format {
                OutputFormat::Table => println!("Stored sessions: {count}"),
                OutputFormat::Json => {
                    output::print_item(&serde_json::json!({ "count": count }), format)
                }
            }
        }
        SessionCommand::Sweep => {
            let removed = SessionCleanup::new(sessions, &config.session)
                .run_cleanup()
                .await?;
            output::print_success(&format!("Removed {removed} idle sessions"));
        }
        SessionCommand::Revoke { token } => {
            if sessions.delete(token).await? {
                output::print_success("Session revoked");
            } else {
                output::print_warning("No session stored for that token");
            }
        }
    }

    Ok(())
}
