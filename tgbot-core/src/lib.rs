//! # tgbot-core
//!
//! Core types and traits for the tgbot framework: the [`Update`] model and its payloads,
//! the filter protocol ([`SimpleFilter`], [`AdvancedFilter`], [`FilterValue`]), the
//! [`Middleware`] contract, error taxonomy, and tracing initialization.
//! Transport-agnostic; used by the dispatch engine, the built-in filters, and the
//! transport adapter.

pub mod error;
pub mod filter;
pub mod logger;
pub mod middleware;
pub mod types;
pub mod update;
pub mod util;

pub use error::{BotError, Result};
pub use filter::{
    keys, AdvancedFilter, BoxFuture, CustomFilter, FilterValue, Filters, PredicateFn, SimpleFilter,
    TextMatch,
};
pub use logger::init_tracing;
pub use middleware::{
    ChatMemberLookup, ExceptionHandler, Middleware, MiddlewareAction, UpdateData,
};
pub use types::{
    CallbackQuery, Chat, ChatJoinRequest, ChatMemberUpdated, ChatType, ChosenInlineResult,
    ContentType, InlineQuery, Message, MessageReactionCountUpdated, MessageReactionUpdated, Poll,
    PollAnswer, PreCheckoutQuery, ShippingQuery, User,
};
pub use update::{Payload, Update, UpdateKind};
pub use util::{extract_arguments, extract_command};
