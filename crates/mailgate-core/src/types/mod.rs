//! Core type definitions used across the Mailgate workspace.

pub mod record;

pub use record::{CredentialRecord, RecordKey};
