//! Boolean message-shape filters: `is_reply`, `is_forwarded`, `is_digit`.

use async_trait::async_trait;
use tgbot_core::{keys, BotError, Message, Payload, Result, SimpleFilter};

fn require_message<'a>(payload: &'a Payload, key: &str) -> Result<&'a Message> {
    payload.message().ok_or_else(|| {
        BotError::FilterEvaluation(format!("{} filter applied to a {} payload", key, payload.kind()))
    })
}

/// `is_reply`: the message replies to another message.
pub struct IsReplyFilter;

#[async_trait]
impl SimpleFilter for IsReplyFilter {
    fn key(&self) -> &str {
        keys::IS_REPLY
    }

    async fn check(&self, payload: &Payload) -> Result<bool> {
        Ok(require_message(payload, self.key())?.reply_to_message.is_some())
    }
}

/// `is_forwarded`: the message was forwarded from somewhere.
pub struct IsForwardedFilter;

#[async_trait]
impl SimpleFilter for IsForwardedFilter {
    fn key(&self) -> &str {
        keys::IS_FORWARDED
    }

    async fn check(&self, payload: &Payload) -> Result<bool> {
        let message = require_message(payload, self.key())?;
        Ok(message.forward_origin.is_some() || message.forward_from_chat.is_some())
    }
}

/// `is_digit`: the message text is entirely ASCII digits.
pub struct IsDigitFilter;

#[async_trait]
impl SimpleFilter for IsDigitFilter {
    fn key(&self) -> &str {
        keys::IS_DIGIT
    }

    async fn check(&self, payload: &Payload) -> Result<bool> {
        let message = require_message(payload, self.key())?;
        let text = message.text.as_deref().ok_or_else(|| {
            BotError::FilterEvaluation("is_digit filter applied to a non-text message".to_string())
        })?;
        Ok(!text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
    }
}
