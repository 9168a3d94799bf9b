// One-shot seed entries from a key-value store: read once, then deleted.

use crate::error::WheelError;

/// Key-value store holding a pre-filled raw entry string.
pub trait SeedStore {
    /// Return the value under `key` and delete it.
    fn take(&mut self, key: &str) -> Result<Option<String>, WheelError>;
}

/// In-memory store, for native hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl SeedStore for MemoryStore {
    fn take(&mut self, key: &str) -> Result<Option<String>, WheelError> {
        Ok(self.values.remove(key))
    }
}
