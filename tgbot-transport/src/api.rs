//! Minimal Bot API client.
//!
//! Speaks only the methods the dispatch loop needs: getUpdates for polling and
//! getChatMember for the admin filter. Every call goes through the standard
//! `{ok, result, description, error_code}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use tgbot_core::{BotError, ChatMemberLookup, Result, Update};

use crate::config::BotConfig;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Anything that can produce update batches for the poller.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetches updates with id >= `offset`, waiting up to `timeout_secs`.
    async fn get_updates(&self, offset: i64, limit: u32, timeout_secs: u64) -> Result<Vec<Update>>;
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Deserialize)]
struct ChatMember {
    status: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(ApiClient {
            http,
            base_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: config.bot_token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        debug!(method, "step: calling Bot API");
        let response = self
            .http
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await
            .map_err(|e| BotError::Transport(format!("{method}: {e}")))?;
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Transport(format!("{method}: {e}")))?;
        if !envelope.ok {
            return Err(BotError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        envelope
            .result
            .ok_or_else(|| BotError::Transport(format!("{method}: ok response without result")))
    }
}

#[async_trait]
impl UpdateSource for ApiClient {
    async fn get_updates(&self, offset: i64, limit: u32, timeout_secs: u64) -> Result<Vec<Update>> {
        let raw: Vec<Value> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "limit": limit,
                    "timeout": timeout_secs,
                }),
            )
            .await?;

        // A malformed batch item is dropped, its siblings still go through.
        // When the broken item's update_id is readable it becomes a
        // payload-less update, so the poller's offset still moves past it
        // instead of re-fetching the same batch forever.
        let mut updates = Vec::with_capacity(raw.len());
        for item in raw {
            let raw_id = item.get("update_id").and_then(Value::as_i64);
            match Update::from_json(item) {
                Ok(update) => updates.push(update),
                Err(err) => match raw_id {
                    Some(update_id) => {
                        warn!(update_id, error = %err, "dropping malformed update");
                        updates.push(Update {
                            update_id,
                            ..Update::default()
                        });
                    }
                    None => warn!(error = %err, "dropping malformed update without an id"),
                },
            }
        }
        Ok(updates)
    }
}

#[async_trait]
impl ChatMemberLookup for ApiClient {
    async fn chat_member_status(&self, chat_id: i64, user_id: i64) -> Result<String> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                json!({"chat_id": chat_id, "user_id": user_id}),
            )
            .await?;
        Ok(member.status)
    }
}
