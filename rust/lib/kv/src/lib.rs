//! Session cache storage: a small key-value interface with per-key ttl,
//! backed by redb on disk or a map in memory.

pub mod entry;
pub mod error;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
