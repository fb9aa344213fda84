//! # mailgate-storage
//!
//! [`RecordStore`](mailgate_core::traits::RecordStore) implementations for
//! Mailgate: one JSON file per session on the local filesystem, or an
//! in-process map.

pub mod manager;
pub mod providers;

pub use manager::build_record_store;
pub use providers::{LocalRecordStore, MemoryRecordStore};
