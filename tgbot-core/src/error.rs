//! Error taxonomy of the dispatch core.
//!
//! Filter and handler failures stay local to one update; only transport and
//! configuration errors propagate to the polling loop. State storage keeps its
//! own error type in the `state-storage` crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// Transport delivered an un-parseable update; the batch item is dropped,
    /// siblings still processed.
    #[error("Malformed update: {0}")]
    MalformedUpdate(String),

    /// A filter predicate failed or could not be evaluated against the payload
    /// kind; treated as a non-match for that handler.
    #[error("Filter evaluation error: {0}")]
    FilterEvaluation(String),

    /// A handler referenced a filter key absent from the registry; logged at
    /// match time and treated as a non-match.
    #[error("Unknown filter key: {0}")]
    UnknownFilterKey(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Error payload returned by the Bot API itself.
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything a user handler raised; captured per update and routed to the
    /// middleware post hook or the exception handler.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
