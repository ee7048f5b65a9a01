//! JSON-file backend.
//!
//! The whole record map is kept in one JSON file and rewritten on every
//! mutation. A process-local mutex serializes access; the file is not safe to
//! share between processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::key::{KeyFormat, StorageKey};
use crate::record::{StateRecord, StateStorage};

pub struct FileStateStorage {
    path: PathBuf,
    format: KeyFormat,
    lock: Mutex<()>,
}

impl FileStateStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStateStorage {
            path: path.into(),
            format: KeyFormat::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_format(path: impl Into<PathBuf>, format: KeyFormat) -> Self {
        FileStateStorage {
            path: path.into(),
            format,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, StateRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn store(&self, records: &HashMap<String, StateRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec(records)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn set_state(&self, key: &StorageKey, state: &str) -> Result<bool> {
        let rendered = key.render(&self.format);
        debug!(key = %rendered, state, path = %self.path.display(), "file: set_state");
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.entry(rendered).or_default().state = Some(state.to_string());
        self.store(&records).await?;
        Ok(true)
    }

    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(&rendered).and_then(|r| r.state.clone()))
    }

    async fn delete_state(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let existed = records.remove(&rendered).is_some();
        if existed {
            self.store(&records).await?;
        }
        Ok(existed)
    }

    async fn set_data(&self, key: &StorageKey, field: &str, value: Value) -> Result<bool> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        match records.get_mut(&rendered) {
            Some(record) => {
                record.data.insert(field.to_string(), value);
                self.store(&records).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_data(&self, key: &StorageKey) -> Result<HashMap<String, Value>> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .get(&rendered)
            .map(|r| r.data.clone())
            .unwrap_or_default())
    }

    async fn reset_data(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        match records.get_mut(&rendered) {
            Some(record) => {
                record.data.clear();
                self.store(&records).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, key: &StorageKey, data: HashMap<String, Value>) -> Result<bool> {
        let rendered = key.render(&self.format);
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        match records.get_mut(&rendered) {
            Some(record) => {
                record.data = data;
                self.store(&records).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> StorageKey {
        StorageKey::new(10, 20)
    }

    /// **Test: Round-trip through the file backend.**
    #[tokio::test]
    async fn state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStateStorage::new(dir.path().join("states.json"));
        let k = key();

        assert!(storage.set_state(&k, "A").await.unwrap());
        assert!(storage.set_data(&k, "x", json!(1)).await.unwrap());
        assert_eq!(storage.get_state(&k).await.unwrap().as_deref(), Some("A"));
        assert_eq!(storage.get_data(&k).await.unwrap().get("x"), Some(&json!(1)));

        assert!(storage.delete_state(&k).await.unwrap());
        assert_eq!(storage.get_state(&k).await.unwrap(), None);
    }

    /// **Test: Records survive reopening the file.**
    ///
    /// **Setup:** One storage writes a record and is dropped.
    /// **Action:** A second storage opens the same path.
    /// **Expected:** State and data are still there.
    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        let k = key();

        {
            let storage = FileStateStorage::new(&path);
            storage.set_state(&k, "checkout").await.unwrap();
            storage.set_data(&k, "cart", json!(["a", "b"])).await.unwrap();
        }

        let reopened = FileStateStorage::new(&path);
        assert_eq!(
            reopened.get_state(&k).await.unwrap().as_deref(),
            Some("checkout")
        );
        assert_eq!(
            reopened.get_data(&k).await.unwrap().get("cart"),
            Some(&json!(["a", "b"]))
        );
    }

    /// **Test: Parent directories are created on first write.**
    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("states.json");
        let storage = FileStateStorage::new(&path);

        assert!(storage.set_state(&key(), "A").await.unwrap());
        assert!(path.exists());
    }

    /// **Test: Data operations without a record report false and write nothing.**
    #[tokio::test]
    async fn data_ops_require_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        let storage = FileStateStorage::new(&path);
        let k = key();

        assert!(!storage.set_data(&k, "x", json!(1)).await.unwrap());
        assert!(!storage.save(&k, HashMap::new()).await.unwrap());
        assert!(!storage.reset_data(&k).await.unwrap());
        assert!(!path.exists());
    }

    /// **Test: State upsert preserves data on disk.**
    #[tokio::test]
    async fn set_state_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStateStorage::new(dir.path().join("states.json"));
        let k = key();

        storage.set_state(&k, "A").await.unwrap();
        storage.set_data(&k, "x", json!(1)).await.unwrap();
        storage.set_state(&k, "B").await.unwrap();

        assert_eq!(storage.get_state(&k).await.unwrap().as_deref(), Some("B"));
        assert_eq!(storage.get_data(&k).await.unwrap().get("x"), Some(&json!(1)));
    }
}
