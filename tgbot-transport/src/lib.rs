//! # tgbot-transport
//!
//! HTTP transport for the Bot API: a minimal client, a long-poll loop that
//! feeds the dispatcher, and the process configuration.
//!
//! ## Modules
//!
//! - [`api`] – ApiClient and the UpdateSource trait
//! - [`config`] – BotConfig (env-driven)
//! - [`poller`] – Poller long-poll loop

mod api;
mod config;
mod poller;

pub use api::{ApiClient, UpdateSource};
pub use config::BotConfig;
pub use poller::{Poller, StopHandle};
