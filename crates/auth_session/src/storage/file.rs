use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::fs;
use tokio::sync::Mutex;

use super::TokenStore;
use crate::error::Result;

/// Key-value store backed by a single JSON object file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).await?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "Discarding unreadable session file {}: {e}",
                    self.path.display()
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        // Readers never see a truncated file: write beside it, then rename over it.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents).await?;
        fs::rename(&staging, &self.path).await?;
        debug!("Wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
