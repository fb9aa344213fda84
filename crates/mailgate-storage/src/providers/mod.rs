//! Record store implementations.

pub mod local;
pub mod memory;

pub use local::LocalRecordStore;
pub use memory::MemoryRecordStore;
