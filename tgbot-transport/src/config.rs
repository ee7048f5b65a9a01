//! Process configuration: token, API URL, polling knobs, log path.
//! Loaded from the environment: BOT_TOKEN, TELEGRAM_API_URL, LOG_FILE.

use std::env;

use tgbot_core::{BotError, Result};

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 20;
const DEFAULT_BATCH_LIMIT: u32 = 100;

/// Minimal bot configuration (Telegram access and logging only).
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub bot_token: String,
    pub api_url: Option<String>,
    pub log_file: Option<String>,
    /// Long-poll wait in seconds, passed through to getUpdates.
    pub poll_timeout_secs: u64,
    /// Maximum updates per getUpdates batch.
    pub batch_limit: u32,
    /// Per-request HTTP timeout. Must exceed `poll_timeout_secs`.
    pub request_timeout_secs: u64,
}

impl BotConfig {
    /// Loads from environment variables: BOT_TOKEN required,
    /// TELEGRAM_API_URL and LOG_FILE optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN")
            .map_err(|_| BotError::Config("BOT_TOKEN not set".to_string()))?;
        let api_url = env::var("TELEGRAM_API_URL").ok();
        let log_file = env::var("LOG_FILE").ok();
        let mut config = Self::with_token(bot_token);
        config.api_url = api_url;
        config.log_file = log_file;
        Ok(config)
    }

    /// Builds a config with the given token and defaults for the rest.
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_url: None,
            log_file: None,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            batch_limit: DEFAULT_BATCH_LIMIT,
            request_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS + 10,
        }
    }
}
