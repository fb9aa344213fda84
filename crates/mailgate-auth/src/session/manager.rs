//! Session lifecycle manager: login, credential resolution, logout.

use std::sync::Arc;

use tracing::{debug, info};

use mailgate_core::error::AppError;
use mailgate_core::result::AppResult;
use mailgate_core::types::RecordKey;

use super::store::{MailCredentials, SessionStore};
use crate::token::TokenCodec;

/// How a caller identifies the mail account to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRequest {
    /// A session token from an earlier login.
    Session(String),
    /// Credentials supplied inline with the call.
    Credentials(MailCredentials),
}

impl CredentialRequest {
    /// Build a request from the optional fields of an incoming call.
    ///
    /// A non-empty session token wins over inline credentials. Inline
    /// credentials need both an email and a password.
    pub fn from_parts(
        session_token: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> AppResult<Self> {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        if let Some(token) = non_empty(session_token) {
            return Ok(Self::Session(token.to_string()));
        }
        match (non_empty(email), non_empty(password)) {
            (Some(email), Some(password)) => {
                Ok(Self::Credentials(MailCredentials::new(email, password)))
            }
            _ => Err(AppError::validation(
                "Session token or credentials required",
            )),
        }
    }
}

/// Manages the session lifecycle on top of the token codec and record store.
#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    sessions: Arc<SessionStore>,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(codec: Arc<TokenCodec>, sessions: Arc<SessionStore>) -> Self {
        Self { codec, sessions }
    }

    /// The underlying record store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Start a session for an account whose credentials the caller has
    /// already verified against the mail server. Returns the session token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let token = self.codec.issue(email)?;
        self.sessions.create(&token, email, password).await?;

        info!(
            session = RecordKey::for_token(&token).short(),
            "Session started"
        );
        Ok(token)
    }

    /// Resolve a request to a usable credential pair.
    ///
    /// A session token must carry a valid signature and be within its
    /// maximum age (`Unauthorized` otherwise) and must still have a stored
    /// record (`NotFound` otherwise).
    pub async fn resolve(&self, request: &CredentialRequest) -> AppResult<MailCredentials> {
        match request {
            CredentialRequest::Credentials(credentials) => Ok(credentials.clone()),
            CredentialRequest::Session(token) => {
                self.codec.verify(token)?;
                let session = self
                    .sessions
                    .get(token)
                    .await?
                    .ok_or_else(|| AppError::not_found("Invalid or expired session"))?;

                debug!(
                    session = RecordKey::for_token(token).short(),
                    "Resolved session credentials"
                );
                Ok(session.credentials)
            }
        }
    }

    /// End the session for `token`. Returns whether a record was removed.
    ///
    /// An empty token is a no-op.
    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        if token.is_empty() {
            return Ok(false);
        }

        let removed = self.sessions.delete(token).await?;
        if removed {
            info!(
                session = RecordKey::for_token(token).short(),
                "Session ended"
            );
        }
        Ok(removed)
    }
}
