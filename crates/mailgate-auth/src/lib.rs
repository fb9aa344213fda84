//! # mailgate-auth
//!
//! API authorization and "stay logged in" sessions for Mailgate.
//!
//! ## Modules
//!
//! - `secret` — loading and generating the process-wide shared secret
//! - `token` — HMAC-SHA256 signed session token issuance and verification
//! - `cipher` — AES-256-GCM encryption of stored mail passwords
//! - `authorizer` — `Bearer <secret>` request authorization
//! - `session` — encrypted credential records, expiry sweep, login/logout flow

pub mod authorizer;
pub mod cipher;
pub mod secret;
pub mod session;
pub mod token;

pub use authorizer::RequestAuthorizer;
pub use cipher::{CredentialCipher, EncryptionKey};
pub use secret::{SecretStore, SharedSecret};
pub use session::{
    CredentialRequest, MailCredentials, SessionCleanup, SessionCredentials, SessionManager,
    SessionStore, SessionSummary,
};
pub use token::{INVALID_TOKEN, TokenCodec, TokenPayload};
