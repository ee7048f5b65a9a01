//! Integration tests for the API client and the long-poll loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dispatch::{Callback, Dispatcher, HandlerResponse};
use tgbot_core::{BotError, ChatMemberLookup, Filters, Result, Update};
use tgbot_transport::{ApiClient, BotConfig, Poller, StopHandle, UpdateSource};

fn test_config(server: &MockServer) -> BotConfig {
    let mut config = BotConfig::with_token("TESTTOKEN");
    config.api_url = Some(server.uri());
    config
}

fn text_update(update_id: i64) -> serde_json::Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 0,
            "chat": {"id": 1, "type": "private"},
            "text": "hello"
        }
    })
}

/// **Test: getUpdates parses the envelope and drops malformed items.**
///
/// **Setup:** Mock server returning two valid updates and one non-object item.
/// **Action:** get_updates.
/// **Expected:** Two updates returned; the malformed item is skipped.
#[tokio::test]
async fn get_updates_drops_malformed_items() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [text_update(5), "garbage", text_update(6)]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let updates = client.get_updates(0, 100, 0).await.unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 5);
    assert_eq!(updates[1].update_id, 6);
}

/// **Test: A malformed item at the batch tail still moves the offset cursor.**
///
/// **Setup:** Mock server whose batch ends with an item carrying a valid
/// `update_id` but a wrong-shaped message body.
/// **Action:** get_updates.
/// **Expected:** The broken item comes back as a payload-less update keeping
/// its id, so the poller can advance past it instead of re-fetching the same
/// batch forever.
#[tokio::test]
async fn get_updates_keeps_cursor_for_malformed_tail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [text_update(5), {"update_id": 7, "message": "nonsense"}]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let updates = client.get_updates(0, 100, 0).await.unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 5);
    assert_eq!(updates[1].update_id, 7);
    assert!(updates[1].clone().into_payload().is_none());
}

/// **Test: The offset parameter reaches the wire.**
#[tokio::test]
async fn get_updates_sends_offset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/getUpdates"))
        .and(body_partial_json(json!({"offset": 42, "limit": 100})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let updates = client.get_updates(42, 100, 0).await.unwrap();
    assert!(updates.is_empty());
}

/// **Test: An ok=false envelope becomes an API error with code and text.**
#[tokio::test]
async fn api_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    match client.get_updates(0, 100, 0).await {
        Err(BotError::Api { code, description }) => {
            assert_eq!(code, 401);
            assert_eq!(description, "Unauthorized");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

/// **Test: getChatMember exposes the member status string.**
#[tokio::test]
async fn chat_member_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTESTTOKEN/getChatMember"))
        .and(body_partial_json(json!({"chat_id": 10, "user_id": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"status": "administrator", "user": {"id": 20, "first_name": "A"}}
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let status = client.chat_member_status(10, 20).await.unwrap();
    assert_eq!(status, "administrator");
}

/// Replays pre-built batches and records every offset it was asked for.
/// Fires the stop handle once the batches run out.
struct ScriptedSource {
    batches: Mutex<VecDeque<Vec<Update>>>,
    offsets: Mutex<Vec<i64>>,
    stop: Mutex<Option<StopHandle>>,
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn get_updates(&self, offset: i64, _limit: u32, _timeout_secs: u64) -> Result<Vec<Update>> {
        self.offsets.lock().unwrap().push(offset);
        match self.batches.lock().unwrap().pop_front() {
            Some(batch) => Ok(batch),
            None => {
                if let Some(stop) = self.stop.lock().unwrap().take() {
                    stop.stop();
                }
                Ok(Vec::new())
            }
        }
    }
}

/// **Test: The poller advances the offset past each batch before dispatching.**
///
/// **Setup:** Scripted source with batches [10, 11] and [12]; a counting handler.
/// **Action:** Run the poller until the source runs dry and stops it.
/// **Expected:** Offsets requested are [0, 12, 13]; all three updates reach the
/// handler.
#[tokio::test]
async fn poller_advances_offset() {
    let batch_one = vec![
        Update::from_json(text_update(10)).unwrap(),
        Update::from_json(text_update(11)).unwrap(),
    ];
    let batch_two = vec![Update::from_json(text_update(12)).unwrap()];

    let source = Arc::new(ScriptedSource {
        batches: Mutex::new(VecDeque::from(vec![batch_one, batch_two])),
        offsets: Mutex::new(Vec::new()),
        stop: Mutex::new(None),
    });

    let handled = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = Dispatcher::new();
    {
        let handled = handled.clone();
        dispatcher.on_message(
            Filters::new(),
            Callback::from_payload(move |_| {
                let handled = handled.clone();
                async move {
                    handled.fetch_add(1, Ordering::SeqCst);
                    Ok(HandlerResponse::Done)
                }
            }),
        );
    }

    let (poller, stop) = Poller::new(source.clone(), Arc::new(dispatcher), &BotConfig::with_token("t"));
    *source.stop.lock().unwrap() = Some(stop);

    poller.run().await;

    assert_eq!(*source.offsets.lock().unwrap(), vec![0, 12, 13]);
    assert_eq!(handled.load(Ordering::SeqCst), 3);
}

/// **Test: A payload-less update at the batch tail still advances the offset.**
///
/// **Setup:** Scripted source with one batch [valid 10, payload-less 11]; a
/// counting handler.
/// **Action:** Run the poller until the source runs dry.
/// **Expected:** The next poll asks for offset 12, past the empty update; only
/// the valid update reaches a handler.
#[tokio::test]
async fn poller_advances_past_payloadless_tail() {
    let batch = vec![
        Update::from_json(text_update(10)).unwrap(),
        Update::from_json(json!({"update_id": 11})).unwrap(),
    ];

    let source = Arc::new(ScriptedSource {
        batches: Mutex::new(VecDeque::from(vec![batch])),
        offsets: Mutex::new(Vec::new()),
        stop: Mutex::new(None),
    });

    let handled = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = Dispatcher::new();
    {
        let handled = handled.clone();
        dispatcher.on_message(
            Filters::new(),
            Callback::from_payload(move |_| {
                let handled = handled.clone();
                async move {
                    handled.fetch_add(1, Ordering::SeqCst);
                    Ok(HandlerResponse::Done)
                }
            }),
        );
    }

    let (poller, stop) = Poller::new(source.clone(), Arc::new(dispatcher), &BotConfig::with_token("t"));
    *source.stop.lock().unwrap() = Some(stop);

    poller.run().await;

    assert_eq!(*source.offsets.lock().unwrap(), vec![0, 12]);
    assert_eq!(handled.load(Ordering::SeqCst), 1);
}
