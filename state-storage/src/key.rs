//! Composite storage keys.
//!
//! A conversation is addressed by chat and user, optionally narrowed by bot,
//! business connection, and message thread. Every backend stores one record
//! per rendered key string.

/// Controls how a [`StorageKey`] is rendered into a flat string.
#[derive(Clone, Debug)]
pub struct KeyFormat {
    pub prefix: String,
    pub separator: String,
}

impl Default for KeyFormat {
    fn default() -> Self {
        KeyFormat {
            prefix: "tgbot".to_string(),
            separator: ":".to_string(),
        }
    }
}

/// Identifies one conversation's state record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub chat_id: i64,
    pub user_id: i64,
    pub bot_id: Option<i64>,
    pub business_connection_id: Option<String>,
    pub message_thread_id: Option<i64>,
}

impl StorageKey {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        StorageKey {
            chat_id,
            user_id,
            bot_id: None,
            business_connection_id: None,
            message_thread_id: None,
        }
    }

    pub fn bot_id(mut self, bot_id: i64) -> Self {
        self.bot_id = Some(bot_id);
        self
    }

    pub fn business_connection_id(mut self, id: impl Into<String>) -> Self {
        self.business_connection_id = Some(id.into());
        self
    }

    pub fn message_thread_id(mut self, id: i64) -> Self {
        self.message_thread_id = Some(id);
        self
    }

    /// Renders the key as `prefix<sep>[bot<sep>]chat<sep>user[<sep>biz][<sep>thread]`.
    ///
    /// Optional parts are omitted entirely when unset, so the same
    /// (chat, user) pair with and without a thread maps to distinct records.
    pub fn render(&self, format: &KeyFormat) -> String {
        let sep = &format.separator;
        let mut out = format.prefix.clone();
        if let Some(bot_id) = self.bot_id {
            out.push_str(sep);
            out.push_str(&bot_id.to_string());
        }
        out.push_str(sep);
        out.push_str(&self.chat_id.to_string());
        out.push_str(sep);
        out.push_str(&self.user_id.to_string());
        if let Some(biz) = &self.business_connection_id {
            out.push_str(sep);
            out.push_str(biz);
        }
        if let Some(thread) = self.message_thread_id {
            out.push_str(sep);
            out.push_str(&thread.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_minimal_key() {
        let key = StorageKey::new(100, 200);
        assert_eq!(key.render(&KeyFormat::default()), "tgbot:100:200");
    }

    #[test]
    fn renders_fully_qualified_key() {
        let key = StorageKey::new(100, 200)
            .bot_id(7)
            .business_connection_id("biz-1")
            .message_thread_id(33);
        assert_eq!(key.render(&KeyFormat::default()), "tgbot:7:100:200:biz-1:33");
    }

    #[test]
    fn custom_format() {
        let format = KeyFormat {
            prefix: "bot".to_string(),
            separator: "/".to_string(),
        };
        assert_eq!(StorageKey::new(1, 2).render(&format), "bot/1/2");
    }

    #[test]
    fn thread_qualified_key_is_distinct() {
        let plain = StorageKey::new(1, 2).render(&KeyFormat::default());
        let threaded = StorageKey::new(1, 2).message_thread_id(5).render(&KeyFormat::default());
        assert_ne!(plain, threaded);
    }
}
