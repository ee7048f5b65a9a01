//! The state record and the backend trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::key::StorageKey;

/// One conversation's stored state: the named step plus a free-form data map.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StateRecord {
    pub state: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

/// Conversation state backend.
///
/// All backends share one contract: a record is created by `set_state` and
/// only by `set_state`. Data operations on a key without a record report
/// `false` and write nothing.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Sets the named state for `key`, creating the record if absent.
    /// An existing record keeps its data map untouched. Always returns true.
    async fn set_state(&self, key: &StorageKey, state: &str) -> Result<bool>;

    /// Current state name, or None when no record exists (or the record
    /// holds no state).
    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>>;

    /// Removes the whole record. True iff a record existed.
    async fn delete_state(&self, key: &StorageKey) -> Result<bool>;

    /// Sets one data field. False (and no write) when no record exists.
    async fn set_data(&self, key: &StorageKey, field: &str, value: Value) -> Result<bool>;

    /// The record's data map, or an empty map when no record exists.
    async fn get_data(&self, key: &StorageKey) -> Result<HashMap<String, Value>>;

    /// Clears the data map, keeping the state. True iff a record existed.
    async fn reset_data(&self, key: &StorageKey) -> Result<bool>;

    /// Replaces the whole data map. False (and no write) when no record
    /// exists.
    async fn save(&self, key: &StorageKey, data: HashMap<String, Value>) -> Result<bool>;
}
