//! File-backed key-value store for native platforms.
//!
//! Each key becomes one file under the base directory, so a board survives
//! process restarts the same way the browser build survives reloads.

use super::{KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::path::PathBuf;

/// One-file-per-key store rooted at a directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if
    /// needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    /// File path for a key, with characters unsafe for filenames replaced.
    fn key_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_key}.dat"))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key);
        fs::write(&path, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {e}", path.display())))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.get("ink").unwrap().is_none());
        store.set("ink", "abc123").unwrap();
        assert_eq!(store.get("ink").unwrap().as_deref(), Some("abc123"));

        store.remove("ink").unwrap();
        assert!(store.get("ink").unwrap().is_none());
    }

    #[test]
    fn test_keys_with_separators_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("courtboard.players", "[]").unwrap();
        assert_eq!(store.get("courtboard.players").unwrap().as_deref(), Some("[]"));
        // The dot never reaches the filesystem as an extension separator.
        assert!(dir.path().join("courtboard_players.dat").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("boards").join("default");
        let store = FileStore::new(nested.clone()).unwrap();
        store.set("markers", "[]").unwrap();
        assert!(nested.exists());
    }
}
