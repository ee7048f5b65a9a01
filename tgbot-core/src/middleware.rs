//! Middleware contract and the hooks the dispatch engine consults around handlers.
//!
//! A middleware declares the update kinds it applies to (an empty list never runs),
//! sees every matching update before handler matching, and again afterwards together
//! with the error the handler raised, if any. `pre_process` can skip handler matching
//! or cancel the update outright.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{BotError, Result};
use crate::update::{Payload, UpdateKind};

/// Per-update key-value map created fresh for each processing attempt and threaded
/// pre → handler → post. Cloning shares the same map.
#[derive(Clone, Debug, Default)]
pub struct UpdateData {
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl UpdateData {
    pub fn new() -> Self {
        UpdateData::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.lock().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Verdict of a middleware pre hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareAction {
    /// Proceed to handler matching.
    Next,
    /// Run no handler; post hooks still run with no error.
    SkipHandlers,
    /// Drop the update; neither handlers nor post hooks run.
    CancelUpdate,
}

/// Interceptor around handler matching for selected update kinds.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Update kinds this middleware applies to. Must be explicit: an empty
    /// list means the middleware never runs.
    fn update_kinds(&self) -> &[UpdateKind];

    /// Runs before handler matching.
    async fn pre_process(&self, payload: &Payload, data: &UpdateData) -> Result<MiddlewareAction>;

    /// Runs after handler matching with the error the handler raised, if any.
    async fn post_process(
        &self,
        payload: &Payload,
        data: &UpdateData,
        error: Option<&BotError>,
    ) -> Result<()>;
}

/// Process-wide hook that receives handler and middleware errors no middleware
/// claimed. The default engine behavior without one is to log the error.
pub trait ExceptionHandler: Send + Sync {
    fn handle(&self, error: &BotError);
}

/// Live chat-member lookup used by the `is_chat_admin` filter. Implemented by the
/// transport's API client; results must not be cached across calls.
#[async_trait]
pub trait ChatMemberLookup: Send + Sync {
    /// Membership status string of `user_id` in `chat_id`, e.g. "member",
    /// "administrator", "creator".
    async fn chat_member_status(&self, chat_id: i64, user_id: i64) -> Result<String>;
}
