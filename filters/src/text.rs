//! Text-content filters: the `text` match filter and `callback_data`.

use async_trait::async_trait;
use tgbot_core::{keys, AdvancedFilter, BotError, FilterValue, Payload, Result};

/// `text` filter: matches the payload's textual content against a [`tgbot_core::TextMatch`]
/// (equals / contains / starts_with / ends_with) or, with a plain text value, against
/// an exact-match candidate list.
pub struct TextMatchFilter;

#[async_trait]
impl AdvancedFilter for TextMatchFilter {
    fn key(&self) -> &str {
        keys::TEXT
    }

    async fn check(&self, payload: &Payload, value: &FilterValue) -> Result<bool> {
        let text = payload.text().ok_or_else(|| {
            BotError::FilterEvaluation(format!("{} payload has no text", payload.kind()))
        })?;
        match value {
            FilterValue::Match(matcher) => {
                if matcher.is_empty() {
                    return Err(BotError::FilterEvaluation(
                        "text filter value has no match mode configured".to_string(),
                    ));
                }
                Ok(matcher.matches(text))
            }
            other => match other.texts() {
                Some(candidates) => Ok(candidates.contains(&text)),
                None => Err(BotError::FilterEvaluation(
                    "text filter expects a text, text list, or match value".to_string(),
                )),
            },
        }
    }
}

/// `callback_data` filter: the callback query's data must be one of the candidates.
pub struct CallbackDataFilter;

#[async_trait]
impl AdvancedFilter for CallbackDataFilter {
    fn key(&self) -> &str {
        keys::CALLBACK_DATA
    }

    async fn check(&self, payload: &Payload, value: &FilterValue) -> Result<bool> {
        let data = match payload {
            Payload::CallbackQuery(query) => query.data.as_deref(),
            _ => {
                return Err(BotError::FilterEvaluation(format!(
                    "callback_data filter applied to a {} payload",
                    payload.kind()
                )))
            }
        };
        let candidates = value.texts().ok_or_else(|| {
            BotError::FilterEvaluation(
                "callback_data filter expects a text or text list value".to_string(),
            )
        })?;
        Ok(data.is_some_and(|d| candidates.contains(&d)))
    }
}
