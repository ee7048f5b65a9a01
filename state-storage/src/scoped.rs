//! Read-modify-write helper over a key's data map.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::key::StorageKey;
use crate::record::StateStorage;

/// A snapshot of one key's data map, edited locally and written back in one
/// `save` call.
///
/// Acquire with [`ScopedData::acquire`], mutate through [`data_mut`], then
/// call [`commit`] to persist. Dropping without committing discards the
/// edits. Sections on the same key do not exclude each other; concurrent
/// commits resolve as last writer wins.
///
/// [`data_mut`]: ScopedData::data_mut
/// [`commit`]: ScopedData::commit
pub struct ScopedData<'a, S: StateStorage + ?Sized> {
    storage: &'a S,
    key: StorageKey,
    data: HashMap<String, Value>,
}

impl<'a, S: StateStorage + ?Sized> ScopedData<'a, S> {
    /// Loads the current data map for `key`.
    pub async fn acquire(storage: &'a S, key: StorageKey) -> Result<ScopedData<'a, S>> {
        let data = storage.get_data(&key).await?;
        Ok(ScopedData { storage, key, data })
    }

    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.data
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    /// Writes the edited map back. False when the record no longer exists.
    pub async fn commit(self) -> Result<bool> {
        self.storage.save(&self.key, self.data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStateStorage;
    use serde_json::json;

    /// **Test: Edits are visible only after commit.**
    #[tokio::test]
    async fn commit_persists_edits() {
        let storage = MemoryStateStorage::new();
        let k = StorageKey::new(1, 2);
        storage.set_state(&k, "form").await.unwrap();
        storage.set_data(&k, "name", json!("alice")).await.unwrap();

        let mut scoped = ScopedData::acquire(&storage, k.clone()).await.unwrap();
        assert_eq!(scoped.data().get("name"), Some(&json!("alice")));
        scoped.insert("age", json!(30));

        // Not yet persisted.
        assert_eq!(storage.get_data(&k).await.unwrap().len(), 1);

        assert!(scoped.commit().await.unwrap());
        let data = storage.get_data(&k).await.unwrap();
        assert_eq!(data.get("age"), Some(&json!(30)));
        assert_eq!(data.get("name"), Some(&json!("alice")));
    }

    /// **Test: Dropping without commit discards the edits.**
    #[tokio::test]
    async fn drop_discards_edits() {
        let storage = MemoryStateStorage::new();
        let k = StorageKey::new(1, 2);
        storage.set_state(&k, "form").await.unwrap();

        {
            let mut scoped = ScopedData::acquire(&storage, k.clone()).await.unwrap();
            scoped.insert("lost", json!(true));
        }

        assert!(storage.get_data(&k).await.unwrap().is_empty());
    }

    /// **Test: Committing against a deleted record reports false.**
    #[tokio::test]
    async fn commit_after_delete_reports_false() {
        let storage = MemoryStateStorage::new();
        let k = StorageKey::new(1, 2);
        storage.set_state(&k, "form").await.unwrap();

        let mut scoped = ScopedData::acquire(&storage, k.clone()).await.unwrap();
        scoped.insert("x", json!(1));
        storage.delete_state(&k).await.unwrap();

        assert!(!scoped.commit().await.unwrap());
    }
}
