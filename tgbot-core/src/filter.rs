//! Filter protocol: the value union supplied at registration, the two custom-filter
//! shapes, and the ordered filter set attached to a handler.
//!
//! Filters are identified by string keys. The engine evaluates the built-in keys
//! (`commands`, `regexp`, `content_types`, `chat_types`, `func`) itself and resolves
//! every other key through the custom-filter registry at match time; an unknown key
//! is a logged non-match, never a registration failure.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{ChatType, ContentType};
use crate::update::Payload;

/// Boxed future used by filter predicates and handler callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Well-known filter keys evaluated by the dispatch engine itself.
pub mod keys {
    pub const COMMANDS: &str = "commands";
    pub const REGEXP: &str = "regexp";
    pub const CONTENT_TYPES: &str = "content_types";
    pub const CHAT_TYPES: &str = "chat_types";
    pub const FUNC: &str = "func";
    pub const TEXT: &str = "text";
    pub const CALLBACK_DATA: &str = "callback_data";
    pub const CHAT_ID: &str = "chat_id";
    pub const IS_REPLY: &str = "is_reply";
    pub const IS_FORWARDED: &str = "is_forwarded";
    pub const IS_DIGIT: &str = "is_digit";
    pub const LANGUAGE_CODE: &str = "language_code";
    pub const IS_CHAT_ADMIN: &str = "is_chat_admin";
}

/// An arbitrary async predicate over the payload (the `func` filter).
#[derive(Clone)]
pub struct PredicateFn(
    Arc<dyn for<'a> Fn(&'a Payload) -> BoxFuture<'a, bool> + Send + Sync>,
);

impl PredicateFn {
    /// Wraps an async predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Payload) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        PredicateFn(Arc::new(f))
    }

    /// Wraps a plain synchronous predicate.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        PredicateFn(Arc::new(move |payload| {
            let verdict = f(payload);
            Box::pin(async move { verdict })
        }))
    }

    pub async fn check(&self, payload: &Payload) -> bool {
        (self.0)(payload).await
    }
}

impl fmt::Debug for PredicateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFn")
    }
}

/// Text-matching modes for the `text` filter: OR across configured modes, OR within
/// each mode's candidate list, optionally case-insensitive.
#[derive(Clone, Debug, Default)]
pub struct TextMatch {
    equals: Option<String>,
    contains: Vec<String>,
    starts_with: Vec<String>,
    ends_with: Vec<String>,
    ignore_case: bool,
}

impl TextMatch {
    pub fn new() -> Self {
        TextMatch::default()
    }

    pub fn equals(mut self, text: impl Into<String>) -> Self {
        self.equals = Some(text.into());
        self
    }

    pub fn contains<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn starts_with<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.starts_with = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn ends_with<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ends_with = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_case(mut self, on: bool) -> Self {
        self.ignore_case = on;
        self
    }

    /// True when no mode was configured; such a value never matches and the
    /// engine reports it as a filter evaluation error.
    pub fn is_empty(&self) -> bool {
        self.equals.is_none()
            && self.contains.is_empty()
            && self.starts_with.is_empty()
            && self.ends_with.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        let subject = if self.ignore_case {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let norm = |s: &String| {
            if self.ignore_case {
                s.to_lowercase()
            } else {
                s.clone()
            }
        };

        if let Some(equals) = &self.equals {
            if norm(equals) == subject {
                return true;
            }
        }
        if self.contains.iter().any(|c| subject.contains(&norm(c))) {
            return true;
        }
        if self.starts_with.iter().any(|p| subject.starts_with(&norm(p))) {
            return true;
        }
        self.ends_with.iter().any(|s| subject.ends_with(&norm(s)))
    }
}

/// The value supplied for one filter key at handler registration.
///
/// Scalar and list shapes are both accepted everywhere: `Text`/`TextList` and
/// `Id`/`IdList` normalize through [`FilterValue::texts`] and [`FilterValue::ids`].
#[derive(Clone, Debug)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
    TextList(Vec<String>),
    Id(i64),
    IdList(Vec<i64>),
    Pattern(String),
    ContentTypes(Vec<ContentType>),
    ChatTypes(Vec<ChatType>),
    Match(TextMatch),
    Predicate(PredicateFn),
}

impl FilterValue {
    /// Text candidates, with a scalar normalized to a one-element list.
    pub fn texts(&self) -> Option<Vec<&str>> {
        match self {
            FilterValue::Text(s) => Some(vec![s.as_str()]),
            FilterValue::TextList(list) => Some(list.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    /// Numeric id candidates, with a scalar normalized to a one-element list.
    pub fn ids(&self) -> Option<Vec<i64>> {
        match self {
            FilterValue::Id(id) => Some(vec![*id]),
            FilterValue::IdList(list) => Some(list.clone()),
            _ => None,
        }
    }

    pub fn flag(&self) -> Option<bool> {
        match self {
            FilterValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::TextList(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(value: Vec<&str>) -> Self {
        FilterValue::TextList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Id(value)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(value: Vec<i64>) -> Self {
        FilterValue::IdList(value)
    }
}

impl From<TextMatch> for FilterValue {
    fn from(value: TextMatch) -> Self {
        FilterValue::Match(value)
    }
}

/// Boolean-valued custom filter: its verdict is compared for equality with the
/// `Flag` value supplied at registration.
#[async_trait]
pub trait SimpleFilter: Send + Sync {
    /// Unique registry key.
    fn key(&self) -> &str;
    async fn check(&self, payload: &Payload) -> Result<bool>;
}

/// Value-valued custom filter: checks the payload against the registration value.
#[async_trait]
pub trait AdvancedFilter: Send + Sync {
    /// Unique registry key.
    fn key(&self) -> &str;
    async fn check(&self, payload: &Payload, value: &FilterValue) -> Result<bool>;
}

/// Tagged union of the two custom-filter shapes, as stored in the registry.
#[derive(Clone)]
pub enum CustomFilter {
    Simple(Arc<dyn SimpleFilter>),
    Advanced(Arc<dyn AdvancedFilter>),
}

impl CustomFilter {
    pub fn simple(filter: impl SimpleFilter + 'static) -> Self {
        CustomFilter::Simple(Arc::new(filter))
    }

    pub fn advanced(filter: impl AdvancedFilter + 'static) -> Self {
        CustomFilter::Advanced(Arc::new(filter))
    }

    pub fn key(&self) -> &str {
        match self {
            CustomFilter::Simple(f) => f.key(),
            CustomFilter::Advanced(f) => f.key(),
        }
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomFilter::Simple(inner) => write!(f, "CustomFilter::Simple({})", inner.key()),
            CustomFilter::Advanced(inner) => write!(f, "CustomFilter::Advanced({})", inner.key()),
        }
    }
}

/// Ordered filter set attached to one handler: key → value, evaluated in insertion
/// order, short-circuiting on the first non-match. Absent keys mean "don't care".
#[derive(Clone, Debug, Default)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Filters::default()
    }

    /// Leading `/command` token must be one of `commands` (case-sensitive,
    /// `@botname` suffix ignored).
    pub fn commands<I, S>(self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(
            keys::COMMANDS,
            FilterValue::TextList(commands.into_iter().map(Into::into).collect()),
        )
    }

    /// Case-insensitive regex search over the text/caption content.
    pub fn regexp(self, pattern: impl Into<String>) -> Self {
        self.with(keys::REGEXP, FilterValue::Pattern(pattern.into()))
    }

    pub fn content_types<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ContentType>,
    {
        self.with(
            keys::CONTENT_TYPES,
            FilterValue::ContentTypes(kinds.into_iter().collect()),
        )
    }

    pub fn chat_types<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ChatType>,
    {
        self.with(
            keys::CHAT_TYPES,
            FilterValue::ChatTypes(kinds.into_iter().collect()),
        )
    }

    /// Arbitrary async predicate over the payload.
    pub fn func(self, predicate: PredicateFn) -> Self {
        self.with(keys::FUNC, FilterValue::Predicate(predicate))
    }

    /// Sets a filter under any key, built-in or custom.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn entries(&self) -> &[(String, FilterValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
