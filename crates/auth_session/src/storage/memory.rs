use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TokenStore;
use crate::error::Result;

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let entries = HashMap::from([(key.to_string(), value.to_string())]);
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("token").await.unwrap(), None);

        store.set("token", "abc").await.unwrap();
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("abc"));

        store.remove("token").await.unwrap();
        store.remove("token").await.unwrap();
        assert_eq!(store.get("token").await.unwrap(), None);
    }
}
