//! # state-storage
//!
//! Conversation state persistence keyed by (chat, user) with optional
//! bot / business-connection / thread qualifiers.
//!
//! ## Modules
//!
//! - [`error`] – StateStorageError
//! - [`key`] – StorageKey and KeyFormat
//! - [`record`] – StateRecord and the StateStorage trait
//! - [`memory`] – in-process backend
//! - [`file`] – JSON-file backend
//! - [`redis_store`] – Redis backend
//! - [`scoped`] – ScopedData read-modify-write helper

mod error;
mod file;
mod key;
mod memory;
mod record;
mod redis_store;
mod scoped;

pub use error::{Result, StateStorageError};
pub use file::FileStateStorage;
pub use key::{KeyFormat, StorageKey};
pub use memory::MemoryStateStorage;
pub use record::{StateRecord, StateStorage};
pub use redis_store::RedisStateStorage;
pub use scoped::ScopedData;
