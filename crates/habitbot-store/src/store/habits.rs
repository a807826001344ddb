//! Habit creation and listing.

use super::Store;
use async_trait::async_trait;
use habitbot_core::{
    error::BotError,
    traits::{HabitStore, HabitSummary},
};
use tracing::info;

/// A stored habit with its tracker.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Habit {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tracker_id: i64,
    pub created_at: String,
}

impl Store {
    /// Create a habit, an empty tracker for it, and link both to the user.
    /// All three rows are written in one transaction.
    pub async fn create_habit(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> Result<i64, BotError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| BotError::storage("begin transaction failed", e))?;

        let habit_id = sqlx::query("INSERT INTO habits (title, description) VALUES (?, ?)")
            .bind(title)
            .bind(description)
            .execute(&mut *tx)
            .await
            .map_err(|e| BotError::storage("create habit failed", e))?
            .last_insert_rowid();

        let tracker_id = sqlx::query("INSERT INTO habit_trackers (habit_id) VALUES (?)")
            .bind(habit_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| BotError::storage("create habit tracker failed", e))?
            .last_insert_rowid();

        sqlx::query(
            "INSERT INTO user_habits (user_id, habit_id, habit_tracker_id) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(habit_id)
        .bind(tracker_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| BotError::storage("link habit to user failed", e))?;

        tx.commit()
            .await
            .map_err(|e| BotError::storage("commit habit failed", e))?;

        info!("created habit {habit_id} for user {user_id}");
        Ok(habit_id)
    }

    /// All habits of a user, oldest first.
    pub async fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>, BotError> {
        sqlx::query_as::<_, Habit>(
            "SELECT h.id, h.title, h.description, uh.habit_tracker_id AS tracker_id, h.created_at \
             FROM habits h \
             INNER JOIN user_habits uh ON h.id = uh.habit_id \
             WHERE uh.user_id = ? \
             ORDER BY h.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BotError::storage("list habits failed", e))
    }
}

#[async_trait]
impl HabitStore for Store {
    async fn create_habit(
        &self,
        owner: &str,
        title: &str,
        description: &str,
    ) -> Result<i64, BotError> {
        let user_id = self.ensure_user(owner).await?;
        Store::create_habit(self, user_id, title, description).await
    }

    async fn list_habits(&self, owner: &str) -> Result<Vec<HabitSummary>, BotError> {
        let Some(user_id) = self.find_user(owner).await? else {
            return Ok(Vec::new());
        };
        let habits = self.habits_for_user(user_id).await?;
        Ok(habits
            .into_iter()
            .map(|h| HabitSummary {
                id: h.id,
                title: h.title,
                description: h.description,
            })
            .collect())
    }
}
