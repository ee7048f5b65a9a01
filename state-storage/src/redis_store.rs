//! Redis backend.
//!
//! One JSON document per rendered key. `set_state`, `set_data`, and
//! `reset_data` run as Lua scripts so the read-modify-write cycle is atomic
//! on the server. `save` is a plain get-then-set and is not atomic: two
//! concurrent sections on the same key resolve as last writer wins.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::key::{KeyFormat, StorageKey};
use crate::record::{StateRecord, StateStorage};

const SET_STATE_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
local record
if raw then
    record = cjson.decode(raw)
else
    record = {}
end
record.state = ARGV[1]
redis.call('SET', KEYS[1], cjson.encode(record))
return 1
"#;

const SET_DATA_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
    return 0
end
local record = cjson.decode(raw)
local data = record.data or {}
data[ARGV[1]] = cjson.decode(ARGV[2])
record.data = data
redis.call('SET', KEYS[1], cjson.encode(record))
return 1
"#;

const RESET_DATA_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
    return 0
end
local record = cjson.decode(raw)
record.data = nil
redis.call('SET', KEYS[1], cjson.encode(record))
return 1
"#;

pub struct RedisStateStorage {
    connection: MultiplexedConnection,
    format: KeyFormat,
    set_state_script: Script,
    set_data_script: Script,
    reset_data_script: Script,
}

impl RedisStateStorage {
    /// Connects to `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self::with_connection(connection, KeyFormat::default()))
    }

    pub fn with_connection(connection: MultiplexedConnection, format: KeyFormat) -> Self {
        RedisStateStorage {
            connection,
            format,
            set_state_script: Script::new(SET_STATE_SCRIPT),
            set_data_script: Script::new(SET_DATA_SCRIPT),
            reset_data_script: Script::new(RESET_DATA_SCRIPT),
        }
    }

    async fn fetch(&self, rendered: &str) -> Result<Option<StateRecord>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(rendered).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateStorage for RedisStateStorage {
    async fn set_state(&self, key: &StorageKey, state: &str) -> Result<bool> {
        let rendered = key.render(&self.format);
        debug!(key = %rendered, state, "redis: set_state");
        let mut conn = self.connection.clone();
        let _: i32 = self
            .set_state_script
            .key(&rendered)
            .arg(state)
            .invoke_async(&mut conn)
            .await?;
        Ok(true)
    }

    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>> {
        let rendered = key.render(&self.format);
        Ok(self.fetch(&rendered).await?.and_then(|r| r.state))
    }

    async fn delete_state(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        let mut conn = self.connection.clone();
        let removed: i32 = conn.del(&rendered).await?;
        Ok(removed > 0)
    }

    async fn set_data(&self, key: &StorageKey, field: &str, value: Value) -> Result<bool> {
        let rendered = key.render(&self.format);
        let encoded = serde_json::to_string(&value)?;
        let mut conn = self.connection.clone();
        let written: i32 = self
            .set_data_script
            .key(&rendered)
            .arg(field)
            .arg(encoded)
            .invoke_async(&mut conn)
            .await?;
        Ok(written == 1)
    }

    async fn get_data(&self, key: &StorageKey) -> Result<HashMap<String, Value>> {
        let rendered = key.render(&self.format);
        Ok(self
            .fetch(&rendered)
            .await?
            .map(|r| r.data)
            .unwrap_or_default())
    }

    async fn reset_data(&self, key: &StorageKey) -> Result<bool> {
        let rendered = key.render(&self.format);
        let mut conn = self.connection.clone();
        let cleared: i32 = self
            .reset_data_script
            .key(&rendered)
            .invoke_async(&mut conn)
            .await?;
        Ok(cleared == 1)
    }

    async fn save(&self, key: &StorageKey, data: HashMap<String, Value>) -> Result<bool> {
        let rendered = key.render(&self.format);
        let mut record = match self.fetch(&rendered).await? {
            Some(record) => record,
            None => return Ok(false),
        };
        record.data = data;
        let encoded = serde_json::to_string(&record)?;
        let mut conn = self.connection.clone();
        let _: () = conn.set(&rendered, encoded).await?;
        Ok(true)
    }
}
