//! Normalized events and the update → event translator.

use crate::error::{BotError, ErrorKind};
use crate::update::Update;

/// Discriminant of an [`Event`], for logging and matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Unknown,
    Message,
}

/// Metadata of a message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub chat_id: i64,
    /// Sender username; Telegram omits it for users without one and for
    /// channel posts.
    pub username: Option<String>,
}

impl Meta {
    /// The sender's username, required by every command and dialog step.
    pub fn sender(&self) -> Result<&str, BotError> {
        match self.username.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(BotError::new(
                ErrorKind::Meta,
                format!("can't get meta: chat {} has no sender username", self.chat_id),
            )),
        }
    }
}

/// A normalized unit of work for the command processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Anything the bot does not understand. Carries no metadata.
    Unknown,
    Message { text: String, meta: Meta },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Unknown => EventType::Unknown,
            Self::Message { .. } => EventType::Message,
        }
    }

    /// Message text; empty for unknown events and non-text messages.
    pub fn text(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::Message { text, .. } => text,
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        match self {
            Self::Unknown => None,
            Self::Message { meta, .. } => Some(meta),
        }
    }
}

/// Map one raw update to one event. Pure and infallible: shapes the bot
/// does not recognize become [`Event::Unknown`].
pub fn translate(update: &Update) -> Event {
    match &update.message {
        None => Event::Unknown,
        Some(msg) => Event::Message {
            text: msg.text.clone().unwrap_or_default(),
            meta: Meta {
                chat_id: msg.chat.id,
                username: msg.from.as_ref().and_then(|u| u.username.clone()),
            },
        },
    }
}
