//! In-memory key-value store.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for testing and ephemeral boards.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        values.remove(key);
        Ok(())
    }
}
