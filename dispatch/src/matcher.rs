//! Filter evaluation against one payload.
//!
//! The engine evaluates the five built-in keys inline and resolves everything else
//! through the custom-filter registry. Every failure mode is fail-closed: an
//! evaluation error or unknown key is logged and counts as a non-match for that
//! handler, never as a dispatch failure.

use regex::RegexBuilder;
use std::collections::HashMap;

use tgbot_core::{
    extract_command, keys, BotError, ContentType, CustomFilter, FilterValue, Payload, Result,
};
use tracing::warn;

use crate::registry::HandlerRecord;

/// True iff every configured filter of `record` passes against `payload`.
/// Short-circuits on the first non-match.
pub(crate) async fn check_handler(
    record: &HandlerRecord,
    payload: &Payload,
    custom: &HashMap<String, CustomFilter>,
) -> bool {
    for (key, value) in record.filter_set().entries() {
        match test_filter(key, value, payload, custom).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(error) => {
                warn!(
                    filter = %key,
                    handler = record.handler_name().unwrap_or("<unnamed>"),
                    error = %error,
                    "filter evaluation failed, treating handler as non-matching"
                );
                return false;
            }
        }
    }
    true
}

async fn test_filter(
    key: &str,
    value: &FilterValue,
    payload: &Payload,
    custom: &HashMap<String, CustomFilter>,
) -> Result<bool> {
    match key {
        keys::CONTENT_TYPES => test_content_types(value, payload),
        keys::REGEXP => test_regexp(value, payload),
        keys::COMMANDS => test_commands(value, payload),
        keys::CHAT_TYPES => test_chat_types(value, payload),
        keys::FUNC => match value {
            FilterValue::Predicate(predicate) => Ok(predicate.check(payload).await),
            _ => Err(BotError::FilterEvaluation(
                "func filter expects a predicate value".to_string(),
            )),
        },
        _ => test_custom(key, value, payload, custom).await,
    }
}

fn test_content_types(value: &FilterValue, payload: &Payload) -> Result<bool> {
    let kinds = match value {
        FilterValue::ContentTypes(kinds) => kinds,
        _ => {
            return Err(BotError::FilterEvaluation(
                "content_types filter expects a content type list".to_string(),
            ))
        }
    };
    let content_type = payload.content_type().ok_or_else(|| {
        BotError::FilterEvaluation(format!("{} payload has no content type", payload.kind()))
    })?;
    Ok(kinds.contains(&content_type))
}

fn test_regexp(value: &FilterValue, payload: &Payload) -> Result<bool> {
    let pattern = match value {
        FilterValue::Pattern(p) | FilterValue::Text(p) => p,
        _ => {
            return Err(BotError::FilterEvaluation(
                "regexp filter expects a pattern value".to_string(),
            ))
        }
    };
    let text = match payload.text() {
        Some(text) => text,
        None => return Ok(false),
    };
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| BotError::FilterEvaluation(format!("invalid regexp '{}': {}", pattern, e)))?;
    Ok(re.is_match(text))
}

fn test_commands(value: &FilterValue, payload: &Payload) -> Result<bool> {
    let commands = value.texts().ok_or_else(|| {
        BotError::FilterEvaluation("commands filter expects a text or text list value".to_string())
    })?;
    let message = match payload.message() {
        Some(m) => m,
        None => {
            return Err(BotError::FilterEvaluation(format!(
                "commands filter applied to a {} payload",
                payload.kind()
            )))
        }
    };
    if message.content_type() != ContentType::Text {
        return Ok(false);
    }
    let text = message.text.as_deref().unwrap_or("");
    Ok(extract_command(text).is_some_and(|cmd| commands.contains(&cmd)))
}

fn test_chat_types(value: &FilterValue, payload: &Payload) -> Result<bool> {
    let kinds = match value {
        FilterValue::ChatTypes(kinds) => kinds,
        _ => {
            return Err(BotError::FilterEvaluation(
                "chat_types filter expects a chat type list".to_string(),
            ))
        }
    };
    let chat = payload.chat().ok_or_else(|| {
        BotError::FilterEvaluation(format!("{} payload has no chat", payload.kind()))
    })?;
    Ok(kinds.contains(&chat.kind))
}

async fn test_custom(
    key: &str,
    value: &FilterValue,
    payload: &Payload,
    custom: &HashMap<String, CustomFilter>,
) -> Result<bool> {
    let filter = custom
        .get(key)
        .ok_or_else(|| BotError::UnknownFilterKey(key.to_string()))?;
    match filter {
        CustomFilter::Simple(simple) => {
            let expected = value.flag().ok_or_else(|| {
                BotError::FilterEvaluation(format!(
                    "simple filter '{}' expects a boolean value",
                    key
                ))
            })?;
            Ok(simple.check(payload).await? == expected)
        }
        CustomFilter::Advanced(advanced) => advanced.check(payload, value).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgbot_core::{ChatType, Filters, Update};

    use crate::registry::{Callback, HandlerRecord, HandlerResponse};

    fn message_payload(text: &str) -> Payload {
        Update::from_json(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "date": 0,
                "chat": {"id": 7, "type": "group"},
                "text": text,
            }
        }))
        .unwrap()
        .into_payload()
        .unwrap()
    }

    fn record(filters: Filters) -> HandlerRecord {
        HandlerRecord::new(Callback::from_payload(|_| async {
            Ok(HandlerResponse::Done)
        }))
        .filters(filters)
    }

    #[tokio::test]
    async fn commands_filter_token_boundary() {
        let custom = HashMap::new();
        let rec = record(Filters::new().commands(["start"]));
        assert!(check_handler(&rec, &message_payload("/start@mybot extra args"), &custom).await);
        assert!(!check_handler(&rec, &message_payload("/stop"), &custom).await);
        assert!(!check_handler(&rec, &message_payload("start"), &custom).await);
    }

    #[tokio::test]
    async fn regexp_filter_is_case_insensitive_search() {
        let custom = HashMap::new();
        let rec = record(Filters::new().regexp("he..o"));
        assert!(check_handler(&rec, &message_payload("well HELLO there"), &custom).await);
        assert!(!check_handler(&rec, &message_payload("goodbye"), &custom).await);
    }

    #[tokio::test]
    async fn invalid_regexp_is_non_match() {
        let custom = HashMap::new();
        let rec = record(Filters::new().regexp("(unclosed"));
        assert!(!check_handler(&rec, &message_payload("anything"), &custom).await);
    }

    #[tokio::test]
    async fn chat_types_filter() {
        let custom = HashMap::new();
        let rec = record(Filters::new().chat_types([ChatType::Group, ChatType::Supergroup]));
        assert!(check_handler(&rec, &message_payload("hi"), &custom).await);
        let private_only = record(Filters::new().chat_types([ChatType::Private]));
        assert!(!check_handler(&private_only, &message_payload("hi"), &custom).await);
    }

    #[tokio::test]
    async fn unknown_filter_key_is_non_match() {
        let custom = HashMap::new();
        let rec = record(Filters::new().with("no_such_filter", true));
        assert!(!check_handler(&rec, &message_payload("hi"), &custom).await);
    }

    #[tokio::test]
    async fn empty_filter_set_matches_everything() {
        let custom = HashMap::new();
        let rec = record(Filters::new());
        assert!(check_handler(&rec, &message_payload("anything at all"), &custom).await);
    }
}
