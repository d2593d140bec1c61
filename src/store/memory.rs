use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;

use super::CredentialStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .lock()
            .insert(String::from(super::TOKEN_KEY), token.into());
        store
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TOKEN_KEY;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "first").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("first"));

        store.set(TOKEN_KEY, "second").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("second"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        // Removing a missing key is not an error.
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_with_token() {
        let store = MemoryStore::with_token("abc");
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}
