//! In-process backend. State is lost on restart.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::key::{KeyFormat, StorageKey};
use crate::record::{StateRecord, StateStorage};

#[derive(Default)]
pub struct MemoryStateStorage {
    format: KeyFormat,
    records: Mutex<HashMap<String, StateRecord>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        MemoryStateStorage::default()
    }

    pub fn with_format(format: KeyFormat) -> Self {
        MemoryStateStorage {
            format,
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StateRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StateStorage for MemoryStateStorage {
    async fn set_state(&self, key: &StorageKey, state: &str) -> Result<bool> {
        let rendered = key.render(&self.format);
        debug!(key = %rendered, state, "memory: set_state");
        self.lock().entry(rendered).or_default().state = Some(state.to_string());
        Ok(true)
    }

    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>> {
        let rendered = key.render(&self.format);
        Ok(self.lock().get(&rendered).and_then(|r| r.state.clone()))
    }

    async fn delete_state(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        Ok(self.lock().remove(&rendered).is_some())
    }

    async fn set_data(&self, key: &StorageKey, field: &str, value: Value) -> Result<bool> {
        let rendered = key.render(&self.format);
        match self.lock().get_mut(&rendered) {
            Some(record) => {
                record.data.insert(field.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_data(&self, key: &StorageKey) -> Result<HashMap<String, Value>> {
        let rendered = key.render(&self.format);
        Ok(self
            .lock()
            .get(&rendered)
            .map(|r| r.data.clone())
            .unwrap_or_default())
    }

    async fn reset_data(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        match self.lock().get_mut(&rendered) {
            Some(record) => {
                record.data.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, key: &StorageKey, data: HashMap<String, Value>) -> Result<bool> {
        let rendered = key.render(&self.format);
        match self.lock().get_mut(&rendered) {
            Some(record) => {
                record.data = data;
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

    /// **Test: State round-trip.**
    ///
    /// **Setup:** Empty memory storage.
    /// **Action:** set_state, set_data, then delete_state.
    /// **Expected:** State and data read back; after deletion the state is
    /// None and the data map is empty.
    #[tokio::test]
    async fn state_round_trip() {
        let storage = MemoryStateStorage::new();
        let k = key();

        assert!(storage.set_state(&k, "A").await.unwrap());
        assert_eq!(storage.get_state(&k).await.unwrap().as_deref(), Some("A"));

        assert!(storage.set_data(&k, "x", json!(1)).await.unwrap());
        let data = storage.get_data(&k).await.unwrap();
        assert_eq!(data.get("x"), Some(&json!(1)));

        assert!(storage.delete_state(&k).await.unwrap());
        assert_eq!(storage.get_state(&k).await.unwrap(), None);
        assert!(storage.get_data(&k).await.unwrap().is_empty());
    }

    /// **Test: Upserting the state preserves existing data.**
    ///
    /// **Setup:** Record in state "A" with one data field.
    /// **Action:** set_state to "B".
    /// **Expected:** State is "B", data untouched.
    #[tokio::test]
    async fn set_state_preserves_data() {
        let storage = MemoryStateStorage::new();
        let k = key();

        storage.set_state(&k, "A").await.unwrap();
        storage.set_data(&k, "x", json!(1)).await.unwrap();
        storage.set_state(&k, "B").await.unwrap();

        assert_eq!(storage.get_state(&k).await.unwrap().as_deref(), Some("B"));
        assert_eq!(storage.get_data(&k).await.unwrap().get("x"), Some(&json!(1)));
    }

    /// **Test: Data operations on a missing record report false.**
    #[tokio::test]
    async fn data_ops_require_record() {
        let storage = MemoryStateStorage::new();
        let k = key();

        assert!(!storage.set_data(&k, "x", json!(1)).await.unwrap());
        assert!(!storage.save(&k, HashMap::new()).await.unwrap());
        assert!(!storage.reset_data(&k).await.unwrap());
        assert!(!storage.delete_state(&k).await.unwrap());
        assert!(storage.get_data(&k).await.unwrap().is_empty());
    }

    /// **Test: reset_data clears the map but keeps the state.**
    #[tokio::test]
    async fn reset_data_keeps_state() {
        let storage = MemoryStateStorage::new();
        let k = key();

        storage.set_state(&k, "A").await.unwrap();
        storage.set_data(&k, "x", json!(1)).await.unwrap();
        assert!(storage.reset_data(&k).await.unwrap());

        assert!(storage.get_data(&k).await.unwrap().is_empty());
        assert_eq!(storage.get_state(&k).await.unwrap().as_deref(), Some("A"));
    }

    /// **Test: save replaces the whole data map.**
    #[tokio::test]
    async fn save_replaces_data() {
        let storage = MemoryStateStorage::new();
        let k = key();

        storage.set_state(&k, "A").await.unwrap();
        storage.set_data(&k, "old", json!(true)).await.unwrap();

        let mut replacement = HashMap::new();
        replacement.insert("new".to_string(), json!(2));
        assert!(storage.save(&k, replacement).await.unwrap());

        let data = storage.get_data(&k).await.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("new"), Some(&json!(2)));
    }

    /// **Test: Qualified keys address separate records.**
    #[tokio::test]
    async fn qualified_keys_are_independent() {
        let storage = MemoryStateStorage::new();
        let plain = StorageKey::new(1, 2);
        let threaded = StorageKey::new(1, 2).message_thread_id(9);

        storage.set_state(&plain, "A").await.unwrap();
        assert_eq!(storage.get_state(&threaded).await.unwrap(), None);
    }
}
