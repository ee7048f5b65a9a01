//! `is_chat_admin`: live administrator check through the API client.

use async_trait::async_trait;
use std::sync::Arc;
use tgbot_core::{keys, BotError, ChatMemberLookup, Payload, Result, SimpleFilter};
use tracing::debug;

/// True iff the sender is an administrator or the owner of the payload's chat.
///
/// Performs a `get_chat_member` lookup on every evaluation; freshness matters more
/// than throughput here, so results are never cached. A lookup failure is a filter
/// evaluation error (non-match), not a dispatch failure.
pub struct IsChatAdminFilter {
    lookup: Arc<dyn ChatMemberLookup>,
}

impl IsChatAdminFilter {
    pub fn new(lookup: Arc<dyn ChatMemberLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl SimpleFilter for IsChatAdminFilter {
    fn key(&self) -> &str {
        keys::IS_CHAT_ADMIN
    }

    async fn check(&self, payload: &Payload) -> Result<bool> {
        let chat = payload.chat().ok_or_else(|| {
            BotError::FilterEvaluation(format!("{} payload has no chat", payload.kind()))
        })?;
        let from = payload.from().ok_or_else(|| {
            BotError::FilterEvaluation(format!("{} payload has no sender", payload.kind()))
        })?;
        let status = self.lookup.chat_member_status(chat.id, from.id).await?;
        debug!(chat_id = chat.id, user_id = from.id, status = %status, "is_chat_admin lookup");
        Ok(status == "administrator" || status == "creator")
    }
}
