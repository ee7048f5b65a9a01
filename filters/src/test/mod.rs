//! Unit tests for the built-in filters: match semantics and fail-closed behavior
//! against payload kinds that lack the needed fields.

use std::sync::Arc;

use async_trait::async_trait;
use tgbot_core::{
    AdvancedFilter, CallbackQuery, ChatMemberLookup, FilterValue, Message, Payload, Poll, Result,
    SimpleFilter, TextMatch, User,
};

use crate::{
    CallbackDataFilter, ChatIdFilter, IsChatAdminFilter, IsDigitFilter, IsReplyFilter,
    LanguageFilter, TextMatchFilter,
};

fn user(id: i64) -> User {
    User {
        id,
        is_bot: false,
        first_name: "Test".to_string(),
        last_name: None,
        username: None,
        language_code: Some("en".to_string()),
    }
}

fn text_message(text: &str) -> Message {
    let raw = serde_json::json!({
        "message_id": 1,
        "date": 0,
        "chat": {"id": 10, "type": "private"},
        "from": {"id": 20, "first_name": "Test", "language_code": "en"},
        "text": text,
    });
    serde_json::from_value(raw).expect("test message")
}

fn message_payload(text: &str) -> Payload {
    Payload::Message(text_message(text))
}

fn poll_payload() -> Payload {
    Payload::Poll(Poll {
        id: "p".to_string(),
        question: "q?".to_string(),
        total_voter_count: 0,
        is_closed: false,
    })
}

fn callback_payload(data: &str) -> Payload {
    Payload::CallbackQuery(CallbackQuery {
        id: "cb".to_string(),
        from: user(20),
        message: Some(Box::new(text_message("origin"))),
        inline_message_id: None,
        data: Some(data.to_string()),
    })
}

#[tokio::test]
async fn text_filter_matches_exact_list() {
    let filter = TextMatchFilter;
    let value = FilterValue::from(vec!["account", "balance"]);
    assert!(filter.check(&message_payload("account"), &value).await.unwrap());
    assert!(!filter.check(&message_payload("other"), &value).await.unwrap());
}

#[tokio::test]
async fn text_filter_match_modes() {
    let filter = TextMatchFilter;
    let value = FilterValue::from(TextMatch::new().starts_with(["Sir"]).ignore_case(true));
    assert!(filter.check(&message_payload("sir, yes sir"), &value).await.unwrap());
    assert!(!filter.check(&message_payload("no no no"), &value).await.unwrap());
}

#[tokio::test]
async fn text_filter_empty_match_is_error() {
    let filter = TextMatchFilter;
    let value = FilterValue::from(TextMatch::new());
    assert!(filter.check(&message_payload("x"), &value).await.is_err());
}

#[tokio::test]
async fn callback_data_filter() {
    let filter = CallbackDataFilter;
    let value = FilterValue::from(vec!["yes", "no"]);
    assert!(filter.check(&callback_payload("yes"), &value).await.unwrap());
    assert!(!filter.check(&callback_payload("maybe"), &value).await.unwrap());
    // Fails closed against a payload kind without callback data.
    assert!(filter.check(&message_payload("yes"), &value).await.is_err());
}

#[tokio::test]
async fn chat_id_filter_scalar_and_list() {
    let filter = ChatIdFilter;
    assert!(filter
        .check(&message_payload("hi"), &FilterValue::from(10i64))
        .await
        .unwrap());
    assert!(filter
        .check(&message_payload("hi"), &FilterValue::from(vec![1i64, 10]))
        .await
        .unwrap());
    assert!(!filter
        .check(&message_payload("hi"), &FilterValue::from(99i64))
        .await
        .unwrap());
    // A poll has no chat.
    assert!(filter
        .check(&poll_payload(), &FilterValue::from(10i64))
        .await
        .is_err());
}

#[tokio::test]
async fn language_filter() {
    let filter = LanguageFilter;
    assert!(filter
        .check(&message_payload("hi"), &FilterValue::from("en"))
        .await
        .unwrap());
    assert!(!filter
        .check(&message_payload("hi"), &FilterValue::from(vec!["de", "fr"]))
        .await
        .unwrap());
}

#[tokio::test]
async fn is_reply_filter() {
    let filter = IsReplyFilter;
    assert!(!filter.check(&message_payload("hi")).await.unwrap());

    let mut message = text_message("hi");
    message.reply_to_message = Some(Box::new(text_message("original")));
    assert!(filter.check(&Payload::Message(message)).await.unwrap());

    assert!(filter.check(&poll_payload()).await.is_err());
}

#[tokio::test]
async fn is_digit_filter() {
    let filter = IsDigitFilter;
    assert!(filter.check(&message_payload("12345")).await.unwrap());
    assert!(!filter.check(&message_payload("12a45")).await.unwrap());
    assert!(!filter.check(&message_payload("")).await.unwrap());
}

struct FixedStatusLookup {
    status: &'static str,
}

#[async_trait]
impl ChatMemberLookup for FixedStatusLookup {
    async fn chat_member_status(&self, _chat_id: i64, _user_id: i64) -> Result<String> {
        Ok(self.status.to_string())
    }
}

#[tokio::test]
async fn is_chat_admin_filter_checks_status() {
    let admin = IsChatAdminFilter::new(Arc::new(FixedStatusLookup {
        status: "administrator",
    }));
    assert!(admin.check(&message_payload("hi")).await.unwrap());

    let creator = IsChatAdminFilter::new(Arc::new(FixedStatusLookup { status: "creator" }));
    assert!(creator.check(&callback_payload("x")).await.unwrap());

    let member = IsChatAdminFilter::new(Arc::new(FixedStatusLookup { status: "member" }));
    assert!(!member.check(&message_payload("hi")).await.unwrap());
}

#[tokio::test]
async fn default_filters_have_unique_keys() {
    let filters = crate::default_filters();
    let mut seen: Vec<&str> = filters.iter().map(|f| f.key()).collect();
    seen.sort_unstable();
    let len_before = seen.len();
    seen.dedup();
    assert_eq!(seen.len(), len_before);
}
