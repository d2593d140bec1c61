pub mod file;
pub mod memory;

use anyhow::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// The key the credential is persisted under.
pub const TOKEN_KEY: &str = "token";

/// A process-wide key-value area the client reads its credential from.
///
/// Each call is atomic on its own, but nothing spans a request: concurrent
/// writers race and the last `set` wins.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
