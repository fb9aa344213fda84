//! # mailgate-core
//!
//! Core crate for Mailgate. Contains the configuration schema, the
//! persisted credential record type, the key-value [`RecordStore`] seam,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Mailgate crates.
//!
//! [`RecordStore`]: traits::RecordStore

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
