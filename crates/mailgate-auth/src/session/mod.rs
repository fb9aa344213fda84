//! Session lifecycle: encrypted credential records, login/logout, and expiry sweeps.

pub mod cleanup;
mod locks;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::{CredentialRequest, SessionManager};
pub use store::{MailCredentials, SessionCredentials, SessionStore, SessionSummary};
