//! Persistent key-value storage for the session token.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that is not present succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
