//! Core traits defined in `mailgate-core` and implemented by other crates.

pub mod record_store;

pub use record_store::RecordStore;
