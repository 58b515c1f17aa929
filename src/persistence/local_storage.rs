//! Browser LocalStorage backend

use super::{KeyValueStore, StorageError};

/// `window.localStorage`, resolved per call so a blocked store degrades to
/// "absent" reads and `Unavailable` writes
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        // setItem only throws on quota exhaustion (or private mode, which looks the same)
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded(key.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage.remove_item(key).map_err(|_| StorageError::Rejected {
            key: key.to_string(),
            reason: "removeItem failed".to_string(),
        })
    }
}
