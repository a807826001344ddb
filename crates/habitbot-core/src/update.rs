//! Raw updates as delivered by the Telegram Bot API.
//!
//! Only the fields the bot reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// One entry of a `getUpdates` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonically increasing identifier; the only ordering the API guarantees.
    #[serde(rename = "update_id")]
    pub id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
    /// Absent for messages posted on behalf of channels.
    #[serde(default)]
    pub from: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl Update {
    /// A text message update, mostly useful for tests and fakes.
    pub fn text(id: i64, chat_id: i64, username: &str, text: &str) -> Self {
        Self {
            id,
            message: Some(Message {
                text: Some(text.to_string()),
                chat: Chat { id: chat_id },
                from: Some(User {
                    id: chat_id,
                    username: Some(username.to_string()),
                }),
            }),
        }
    }

    /// An update that carries no message payload (edits, callbacks, polls...).
    pub fn empty(id: i64) -> Self {
        Self { id, message: None }
    }
}
