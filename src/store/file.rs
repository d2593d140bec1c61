use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

use crate::filelock::{read_file, write_file_lock};

use super::CredentialStore;

/// Stores values as a flat json object, e.g. `{"token": "..."}`.
///
/// Every operation re-reads the file, so values written by another process
/// are picked up on the next request.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        let data = match read_file(&self.path)? {
            Some(data) => data,
            None => return Ok(BTreeMap::new()),
        };
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_slice(&data) {
            Ok(values) => Ok(values),
            Err(_) => {
                warn!(
                    "Store file '{}' has invalid data, we will ignore it",
                    self.path.display()
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec(values).context("encode store json")?;
        write_file_lock(&self.path, &data)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.read()?;
        Ok(values.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read()?;
        values.insert(key.to_string(), value.to_string());
        self.write(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write(&values)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;

    use super::*;
    use crate::store::TOKEN_KEY;

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        store.set("user", "admin").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        // A second handle on the same file sees the same values.
        let other = FileStore::new(store.path());
        assert_eq!(other.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        other.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get("user").unwrap().as_deref(), Some("admin"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"user":"admin"}"#);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "fresh").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_stored_token_never_reads_absent() {
        const ITERATIONS: usize = 500;

        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        store.set(TOKEN_KEY, "abc").unwrap();

        let writer_store = store.clone();
        let writer = thread::spawn(move || {
            for _ in 0..ITERATIONS {
                writer_store.set(TOKEN_KEY, "abc").unwrap();
            }
        });

        for _ in 0..ITERATIONS {
            assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        }
        writer.join().unwrap();
    }
}
