//! Chat- and sender-scoped filters: `chat_id` and `language_code`.

use async_trait::async_trait;
use tgbot_core::{keys, AdvancedFilter, BotError, FilterValue, Payload, Result};

/// `chat_id` filter: the payload's chat id must be one of the candidates.
pub struct ChatIdFilter;

#[async_trait]
impl AdvancedFilter for ChatIdFilter {
    fn key(&self) -> &str {
        keys::CHAT_ID
    }

    async fn check(&self, payload: &Payload, value: &FilterValue) -> Result<bool> {
        let chat = payload.chat().ok_or_else(|| {
            BotError::FilterEvaluation(format!("{} payload has no chat", payload.kind()))
        })?;
        let candidates = value.ids().ok_or_else(|| {
            BotError::FilterEvaluation("chat_id filter expects an id or id list value".to_string())
        })?;
        Ok(candidates.contains(&chat.id))
    }
}

/// `language_code` filter: the sender's language code must be one of the candidates.
/// A sender without a language code never matches.
pub struct LanguageFilter;

#[async_trait]
impl AdvancedFilter for LanguageFilter {
    fn key(&self) -> &str {
        keys::LANGUAGE_CODE
    }

    async fn check(&self, payload: &Payload, value: &FilterValue) -> Result<bool> {
        let from = payload.from().ok_or_else(|| {
            BotError::FilterEvaluation(format!("{} payload has no sender", payload.kind()))
        })?;
        let candidates = value.texts().ok_or_else(|| {
            BotError::FilterEvaluation(
                "language_code filter expects a text or text list value".to_string(),
            )
        })?;
        Ok(from
            .language_code
            .as_deref()
            .is_some_and(|code| candidates.contains(&code)))
    }
}
