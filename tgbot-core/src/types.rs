//! Payload types delivered inside an update: message, queries, polls, membership changes.
//!
//! Only the fields the dispatch core consults are typed; media attachments are kept as
//! opaque JSON blobs whose presence drives [`Message::content_type`]. Unknown wire fields
//! are ignored for forward compatibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User identity (id, names, language).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// Kind of chat a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

/// Chat identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatType,
    pub title: Option<String>,
    pub username: Option<String>,
}

/// Content kind of a message, derived from which attachment field is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Audio,
    Document,
    Animation,
    Game,
    Photo,
    Sticker,
    Video,
    VideoNote,
    Voice,
    Contact,
    Location,
    Venue,
    Dice,
    Poll,
    NewChatMembers,
    LeftChatMember,
    PinnedMessage,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Audio => "audio",
            ContentType::Document => "document",
            ContentType::Animation => "animation",
            ContentType::Game => "game",
            ContentType::Photo => "photo",
            ContentType::Sticker => "sticker",
            ContentType::Video => "video",
            ContentType::VideoNote => "video_note",
            ContentType::Voice => "voice",
            ContentType::Contact => "contact",
            ContentType::Location => "location",
            ContentType::Venue => "venue",
            ContentType::Dice => "dice",
            ContentType::Poll => "poll",
            ContentType::NewChatMembers => "new_chat_members",
            ContentType::LeftChatMember => "left_chat_member",
            ContentType::PinnedMessage => "pinned_message",
            ContentType::Unknown => "unknown",
        }
    }
}

/// One message (also covers edited messages and channel posts).
///
/// Attachment fields stay untyped: the core only needs to know which one is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub message_thread_id: Option<i64>,
    pub business_connection_id: Option<String>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to_message: Option<Box<Message>>,
    pub forward_origin: Option<Value>,
    pub forward_from_chat: Option<Value>,
    pub audio: Option<Value>,
    pub document: Option<Value>,
    pub animation: Option<Value>,
    pub game: Option<Value>,
    pub photo: Option<Value>,
    pub sticker: Option<Value>,
    pub video: Option<Value>,
    pub video_note: Option<Value>,
    pub voice: Option<Value>,
    pub contact: Option<Value>,
    pub location: Option<Value>,
    pub venue: Option<Value>,
    pub dice: Option<Value>,
    pub poll: Option<Value>,
    pub new_chat_members: Option<Value>,
    pub left_chat_member: Option<Value>,
    pub pinned_message: Option<Value>,
}

impl Message {
    /// Derives the content kind from the first attachment field present.
    /// `text` wins; `animation` is checked before `document` because animations
    /// arrive with both fields set.
    pub fn content_type(&self) -> ContentType {
        if self.text.is_some() {
            ContentType::Text
        } else if self.audio.is_some() {
            ContentType::Audio
        } else if self.animation.is_some() {
            ContentType::Animation
        } else if self.document.is_some() {
            ContentType::Document
        } else if self.game.is_some() {
            ContentType::Game
        } else if self.photo.is_some() {
            ContentType::Photo
        } else if self.sticker.is_some() {
            ContentType::Sticker
        } else if self.video.is_some() {
            ContentType::Video
        } else if self.video_note.is_some() {
            ContentType::VideoNote
        } else if self.voice.is_some() {
            ContentType::Voice
        } else if self.contact.is_some() {
            ContentType::Contact
        } else if self.location.is_some() {
            ContentType::Location
        } else if self.venue.is_some() {
            ContentType::Venue
        } else if self.dice.is_some() {
            ContentType::Dice
        } else if self.poll.is_some() {
            ContentType::Poll
        } else if self.new_chat_members.is_some() {
            ContentType::NewChatMembers
        } else if self.left_chat_member.is_some() {
            ContentType::LeftChatMember
        } else if self.pinned_message.is_some() {
            ContentType::PinnedMessage
        } else {
            ContentType::Unknown
        }
    }

    /// Text or caption, whichever is present.
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }
}

/// Button press on an inline keyboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Box<Message>>,
    pub inline_message_id: Option<String>,
    pub data: Option<String>,
}

/// Incoming inline query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
    #[serde(default)]
    pub offset: String,
}

/// Inline result the user picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    pub result_id: String,
    pub from: User,
    pub query: String,
}

/// Shipping query from an invoice with flexible pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingQuery {
    pub id: String,
    pub from: User,
    pub invoice_payload: String,
}

/// Pre-checkout confirmation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
}

/// Poll state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub total_voter_count: i64,
    #[serde(default)]
    pub is_closed: bool,
}

/// A user's answer in a non-anonymous poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAnswer {
    pub poll_id: String,
    pub user: Option<User>,
    #[serde(default)]
    pub option_ids: Vec<i64>,
}

/// Membership change of the bot or another member; covers both the
/// `my_chat_member` and `chat_member` update kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    #[serde(default)]
    pub date: i64,
    pub old_chat_member: Value,
    pub new_chat_member: Value,
}

/// Request to join a chat that requires approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    pub from: User,
    pub user_chat_id: Option<i64>,
    #[serde(default)]
    pub date: i64,
}

/// Reaction change on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReactionUpdated {
    pub chat: Chat,
    pub message_id: i64,
    pub user: Option<User>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub old_reaction: Value,
    #[serde(default)]
    pub new_reaction: Value,
}

/// Anonymous reaction count change on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReactionCountUpdated {
    pub chat: Chat,
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub reactions: Value,
}
