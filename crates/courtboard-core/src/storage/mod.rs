//! Persistence port and backends.
//!
//! The session never touches a real storage mechanism directly; it is handed
//! a [`KeyValueStore`] at construction. Backends can be in-memory (tests,
//! ephemeral boards), files on disk, or a browser storage bridge supplied by
//! the embedding shell.

mod file;
mod gateway;
mod memory;

pub use file::FileStore;
pub use gateway::{PersistedState, PersistenceGateway};
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque string key-value store with get/set/remove.
///
/// Absence of a key is `Ok(None)`, not an error; a board that has never been
/// saved starts empty. Implementations use interior mutability so a store
/// can be shared between a session and its host.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}
