//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` string get/set contract injected into progression,
//!   settings and the courier high score
//! - In-memory store (native builds and tests)
//! - Write-through session overlay so a failed write never loses the
//!   in-session value
//! - Browser LocalStorage store (wasm32)

use std::collections::HashMap;

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

/// Why a write did not reach durable storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage quota exceeded writing `{0}`")]
    QuotaExceeded(String),
    #[error("write to `{key}` rejected: {reason}")]
    Rejected { key: String, reason: String },
}

/// Synchronous string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Persisted key names
pub mod keys {
    pub const COURIER_HIGHSCORE: &str = "courier_highscore";
    pub const AUDIO_MUTED: &str = "audioMuted";
    pub const ONBOARDING_SEEN: &str = "onboarding_seen";

    pub fn best_time(course_index: usize) -> String {
        format!("best_time_{course_index}")
    }

    pub fn ghost(course_index: usize) -> String {
        format!("ghost_{course_index}")
    }
}

/// HashMap-backed store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Simulate an unavailable backend: every write fails
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable);
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// Write-through overlay over a durable store.
///
/// Writes land in memory first, then go to the backing store; reads prefer
/// the overlay. A backing failure is reported but the value stays visible
/// for the rest of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S> {
    backing: S,
    overlay: HashMap<String, Option<String>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backing: S) -> Self {
        Self {
            backing,
            overlay: HashMap::new(),
        }
    }

    pub fn backing(&self) -> &S {
        &self.backing
    }

    pub fn backing_mut(&mut self) -> &mut S {
        &mut self.backing
    }
}

impl<S: KeyValueStore> KeyValueStore for SessionStore<S> {
    fn get(&self, key: &str) -> Option<String> {
        match self.overlay.get(key) {
            Some(value) => value.clone(),
            None => self.backing.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.overlay.insert(key.to_string(), Some(value.to_string()));
        self.backing.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.overlay.insert(key.to_string(), None);
        self.backing.remove(key)
    }
}

/// Write, logging instead of failing: durability is best effort
pub fn set_or_warn(store: &mut impl KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to persist `{}`: {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_store_survives_backing_failure() {
        let mut store = SessionStore::new(MemoryStore::failing());
        assert_eq!(store.set("best_time_0", "42000"), Err(StorageError::Unavailable));
        assert_eq!(store.get("best_time_0").as_deref(), Some("42000"));
        assert!(store.backing().is_empty());

        store.remove("best_time_0").ok();
        assert!(store.get("best_time_0").is_none());
    }

    #[test]
    fn test_session_store_reads_through() {
        let mut backing = MemoryStore::new();
        backing.set("k", "v").unwrap();
        let store = SessionStore::new(backing);
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_keys() {
        assert_eq!(keys::best_time(2), "best_time_2");
        assert_eq!(keys::ghost(0), "ghost_0");
    }
}
