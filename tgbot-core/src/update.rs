//! The [`Update`] wire model and its classification into a [`Payload`].
//!
//! One update carries at most one payload; classification picks the first populated
//! field in declaration order. Unknown top-level keys are ignored so newer Bot API
//! revisions never break deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{BotError, Result};
use crate::types::{
    CallbackQuery, Chat, ChatJoinRequest, ChatMemberUpdated, ChosenInlineResult, ContentType,
    InlineQuery, Message, MessageReactionCountUpdated, MessageReactionUpdated, Poll, PollAnswer,
    PreCheckoutQuery, ShippingQuery, User,
};

/// The kind of payload an update carries; one handler registry exists per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    MessageReaction,
    MessageReactionCount,
}

impl UpdateKind {
    /// Every kind, in wire declaration order.
    pub const ALL: [UpdateKind; 16] = [
        UpdateKind::Message,
        UpdateKind::EditedMessage,
        UpdateKind::ChannelPost,
        UpdateKind::EditedChannelPost,
        UpdateKind::InlineQuery,
        UpdateKind::ChosenInlineResult,
        UpdateKind::CallbackQuery,
        UpdateKind::ShippingQuery,
        UpdateKind::PreCheckoutQuery,
        UpdateKind::Poll,
        UpdateKind::PollAnswer,
        UpdateKind::MyChatMember,
        UpdateKind::ChatMember,
        UpdateKind::ChatJoinRequest,
        UpdateKind::MessageReaction,
        UpdateKind::MessageReactionCount,
    ];

    /// Wire name of the kind (the top-level key in an update object).
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Message => "message",
            UpdateKind::EditedMessage => "edited_message",
            UpdateKind::ChannelPost => "channel_post",
            UpdateKind::EditedChannelPost => "edited_channel_post",
            UpdateKind::InlineQuery => "inline_query",
            UpdateKind::ChosenInlineResult => "chosen_inline_result",
            UpdateKind::CallbackQuery => "callback_query",
            UpdateKind::ShippingQuery => "shipping_query",
            UpdateKind::PreCheckoutQuery => "pre_checkout_query",
            UpdateKind::Poll => "poll",
            UpdateKind::PollAnswer => "poll_answer",
            UpdateKind::MyChatMember => "my_chat_member",
            UpdateKind::ChatMember => "chat_member",
            UpdateKind::ChatJoinRequest => "chat_join_request",
            UpdateKind::MessageReaction => "message_reaction",
            UpdateKind::MessageReactionCount => "message_reaction_count",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivered event. `update_id` is the polling offset cursor; at most one
/// payload field is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
    pub channel_post: Option<Message>,
    pub edited_channel_post: Option<Message>,
    pub inline_query: Option<InlineQuery>,
    pub chosen_inline_result: Option<ChosenInlineResult>,
    pub callback_query: Option<CallbackQuery>,
    pub shipping_query: Option<ShippingQuery>,
    pub pre_checkout_query: Option<PreCheckoutQuery>,
    pub poll: Option<Poll>,
    pub poll_answer: Option<PollAnswer>,
    pub my_chat_member: Option<ChatMemberUpdated>,
    pub chat_member: Option<ChatMemberUpdated>,
    pub chat_join_request: Option<ChatJoinRequest>,
    pub message_reaction: Option<MessageReactionUpdated>,
    pub message_reaction_count: Option<MessageReactionCountUpdated>,
}

impl Update {
    /// Deserializes one update from a raw JSON object.
    ///
    /// Fails with [`BotError::MalformedUpdate`] only when the value is not an object
    /// (or a known field carries the wrong shape); absent fields mean "no payload of
    /// that kind" and unknown keys are ignored.
    pub fn from_json(raw: Value) -> Result<Update> {
        if !raw.is_object() {
            return Err(BotError::MalformedUpdate(format!(
                "expected a JSON object, got {}",
                raw
            )));
        }
        serde_json::from_value(raw).map_err(|e| BotError::MalformedUpdate(e.to_string()))
    }

    /// The kind of the populated payload field, if any, in declaration order.
    pub fn kind(&self) -> Option<UpdateKind> {
        if self.message.is_some() {
            Some(UpdateKind::Message)
        } else if self.edited_message.is_some() {
            Some(UpdateKind::EditedMessage)
        } else if self.channel_post.is_some() {
            Some(UpdateKind::ChannelPost)
        } else if self.edited_channel_post.is_some() {
            Some(UpdateKind::EditedChannelPost)
        } else if self.inline_query.is_some() {
            Some(UpdateKind::InlineQuery)
        } else if self.chosen_inline_result.is_some() {
            Some(UpdateKind::ChosenInlineResult)
        } else if self.callback_query.is_some() {
            Some(UpdateKind::CallbackQuery)
        } else if self.shipping_query.is_some() {
            Some(UpdateKind::ShippingQuery)
        } else if self.pre_checkout_query.is_some() {
            Some(UpdateKind::PreCheckoutQuery)
        } else if self.poll.is_some() {
            Some(UpdateKind::Poll)
        } else if self.poll_answer.is_some() {
            Some(UpdateKind::PollAnswer)
        } else if self.my_chat_member.is_some() {
            Some(UpdateKind::MyChatMember)
        } else if self.chat_member.is_some() {
            Some(UpdateKind::ChatMember)
        } else if self.chat_join_request.is_some() {
            Some(UpdateKind::ChatJoinRequest)
        } else if self.message_reaction.is_some() {
            Some(UpdateKind::MessageReaction)
        } else if self.message_reaction_count.is_some() {
            Some(UpdateKind::MessageReactionCount)
        } else {
            None
        }
    }

    /// Consumes the update, yielding its payload. `None` for an empty update,
    /// which dispatch treats as a no-op.
    pub fn into_payload(self) -> Option<Payload> {
        if let Some(m) = self.message {
            Some(Payload::Message(m))
        } else if let Some(m) = self.edited_message {
            Some(Payload::EditedMessage(m))
        } else if let Some(m) = self.channel_post {
            Some(Payload::ChannelPost(m))
        } else if let Some(m) = self.edited_channel_post {
            Some(Payload::EditedChannelPost(m))
        } else if let Some(q) = self.inline_query {
            Some(Payload::InlineQuery(q))
        } else if let Some(r) = self.chosen_inline_result {
            Some(Payload::ChosenInlineResult(r))
        } else if let Some(q) = self.callback_query {
            Some(Payload::CallbackQuery(q))
        } else if let Some(q) = self.shipping_query {
            Some(Payload::ShippingQuery(q))
        } else if let Some(q) = self.pre_checkout_query {
            Some(Payload::PreCheckoutQuery(q))
        } else if let Some(p) = self.poll {
            Some(Payload::Poll(p))
        } else if let Some(a) = self.poll_answer {
            Some(Payload::PollAnswer(a))
        } else if let Some(u) = self.my_chat_member {
            Some(Payload::MyChatMember(u))
        } else if let Some(u) = self.chat_member {
            Some(Payload::ChatMember(u))
        } else if let Some(r) = self.chat_join_request {
            Some(Payload::ChatJoinRequest(r))
        } else if let Some(r) = self.message_reaction {
            Some(Payload::MessageReaction(r))
        } else {
            self.message_reaction_count.map(Payload::MessageReactionCount)
        }
    }
}

/// The one populated payload of an update, passed to filters, middleware, and handlers.
#[derive(Debug, Clone)]
pub enum Payload {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    Poll(Poll),
    PollAnswer(PollAnswer),
    MyChatMember(ChatMemberUpdated),
    ChatMember(ChatMemberUpdated),
    ChatJoinRequest(ChatJoinRequest),
    MessageReaction(MessageReactionUpdated),
    MessageReactionCount(MessageReactionCountUpdated),
}

impl Payload {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Payload::Message(_) => UpdateKind::Message,
            Payload::EditedMessage(_) => UpdateKind::EditedMessage,
            Payload::ChannelPost(_) => UpdateKind::ChannelPost,
            Payload::EditedChannelPost(_) => UpdateKind::EditedChannelPost,
            Payload::InlineQuery(_) => UpdateKind::InlineQuery,
            Payload::ChosenInlineResult(_) => UpdateKind::ChosenInlineResult,
            Payload::CallbackQuery(_) => UpdateKind::CallbackQuery,
            Payload::ShippingQuery(_) => UpdateKind::ShippingQuery,
            Payload::PreCheckoutQuery(_) => UpdateKind::PreCheckoutQuery,
            Payload::Poll(_) => UpdateKind::Poll,
            Payload::PollAnswer(_) => UpdateKind::PollAnswer,
            Payload::MyChatMember(_) => UpdateKind::MyChatMember,
            Payload::ChatMember(_) => UpdateKind::ChatMember,
            Payload::ChatJoinRequest(_) => UpdateKind::ChatJoinRequest,
            Payload::MessageReaction(_) => UpdateKind::MessageReaction,
            Payload::MessageReactionCount(_) => UpdateKind::MessageReactionCount,
        }
    }

    /// The inner message for the four message-like kinds.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Payload::Message(m)
            | Payload::EditedMessage(m)
            | Payload::ChannelPost(m)
            | Payload::EditedChannelPost(m) => Some(m),
            _ => None,
        }
    }

    /// The chat this payload belongs to, when it has one. For a callback query
    /// this is the chat of the originating message.
    pub fn chat(&self) -> Option<&Chat> {
        match self {
            Payload::Message(m)
            | Payload::EditedMessage(m)
            | Payload::ChannelPost(m)
            | Payload::EditedChannelPost(m) => Some(&m.chat),
            Payload::CallbackQuery(q) => q.message.as_deref().map(|m| &m.chat),
            Payload::MyChatMember(u) | Payload::ChatMember(u) => Some(&u.chat),
            Payload::ChatJoinRequest(r) => Some(&r.chat),
            Payload::MessageReaction(r) => Some(&r.chat),
            Payload::MessageReactionCount(r) => Some(&r.chat),
            _ => None,
        }
    }

    /// The user this payload originates from, when it has one.
    pub fn from(&self) -> Option<&User> {
        match self {
            Payload::Message(m)
            | Payload::EditedMessage(m)
            | Payload::ChannelPost(m)
            | Payload::EditedChannelPost(m) => m.from.as_ref(),
            Payload::InlineQuery(q) => Some(&q.from),
            Payload::ChosenInlineResult(r) => Some(&r.from),
            Payload::CallbackQuery(q) => Some(&q.from),
            Payload::ShippingQuery(q) => Some(&q.from),
            Payload::PreCheckoutQuery(q) => Some(&q.from),
            Payload::PollAnswer(a) => a.user.as_ref(),
            Payload::MyChatMember(u) | Payload::ChatMember(u) => Some(&u.from),
            Payload::ChatJoinRequest(r) => Some(&r.from),
            Payload::MessageReaction(r) => r.user.as_ref(),
            _ => None,
        }
    }

    /// Textual content filters match against: message text or caption, callback
    /// data, inline query text, or poll question.
    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Message(m)
            | Payload::EditedMessage(m)
            | Payload::ChannelPost(m)
            | Payload::EditedChannelPost(m) => m.text_content(),
            Payload::CallbackQuery(q) => q.data.as_deref(),
            Payload::InlineQuery(q) => Some(&q.query),
            Payload::ChosenInlineResult(r) => Some(&r.query),
            Payload::Poll(p) => Some(&p.question),
            _ => None,
        }
    }

    /// Content kind, defined for message-like payloads only.
    pub fn content_type(&self) -> Option<ContentType> {
        self.message().map(Message::content_type)
    }
}
