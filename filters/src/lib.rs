//! # filters
//!
//! Built-in custom filters for the dispatch engine. Every filter here fails closed:
//! when a payload kind does not carry what the filter needs (e.g. `chat_id` against
//! a poll), `check` returns an error and the engine logs it and treats the handler
//! as non-matching.
//!
//! All of these except [`IsChatAdminFilter`] are seeded into a new dispatcher by
//! default. `is_chat_admin` needs a live [`tgbot_core::ChatMemberLookup`] and must
//! be registered explicitly with an API client.

mod admin;
mod chat;
mod flags;
mod text;

#[cfg(test)]
mod test;

pub use admin::IsChatAdminFilter;
pub use chat::{ChatIdFilter, LanguageFilter};
pub use flags::{IsDigitFilter, IsForwardedFilter, IsReplyFilter};
pub use text::{CallbackDataFilter, TextMatchFilter};

use tgbot_core::CustomFilter;

/// The custom filters every dispatcher starts with.
pub fn default_filters() -> Vec<CustomFilter> {
    vec![
        CustomFilter::advanced(TextMatchFilter),
        CustomFilter::advanced(CallbackDataFilter),
        CustomFilter::advanced(ChatIdFilter),
        CustomFilter::advanced(LanguageFilter),
        CustomFilter::simple(IsReplyFilter),
        CustomFilter::simple(IsForwardedFilter),
        CustomFilter::simple(IsDigitFilter),
    ]
}
