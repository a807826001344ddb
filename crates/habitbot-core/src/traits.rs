use crate::{error::BotError, event::Event, update::Update};
use async_trait::async_trait;

/// Source of raw updates: the bot platform's long-polling endpoint.
///
/// Implementations return updates with `id >= offset` in ascending order.
/// An empty batch is a normal result. They never retry, sleep, or cache;
/// the caller owns the retry policy.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch(&self, offset: i64, limit: usize) -> Result<Vec<Update>, BotError>;
}

/// Consumer of normalized events.
#[async_trait]
pub trait EventProcessor: Send + Sync {
    async fn process(&self, event: Event) -> Result<(), BotError>;
}

/// Outbound plain-text replies to a chat.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError>;
}

/// A habit as listed back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// Habit persistence as seen by the bot. Owners are identified by their
/// Telegram username.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Create a habit for `owner`, registering the owner on first use.
    async fn create_habit(
        &self,
        owner: &str,
        title: &str,
        description: &str,
    ) -> Result<i64, BotError>;

    /// All habits of `owner`; empty for unknown owners.
    async fn list_habits(&self, owner: &str) -> Result<Vec<HabitSummary>, BotError>;
}
