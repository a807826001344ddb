//! Telegram user registration and lookup.

use super::Store;
use habitbot_core::error::BotError;

impl Store {
    /// Return the id of the user with this Telegram username, creating the
    /// user if needed.
    pub async fn ensure_user(&self, tg_username: &str) -> Result<i64, BotError> {
        sqlx::query("INSERT INTO users (tg_username) VALUES (?) ON CONFLICT(tg_username) DO NOTHING")
            .bind(tg_username)
            .execute(&self.pool)
            .await
            .map_err(|e| BotError::storage("create user failed", e))?;

        let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE tg_username = ?")
            .bind(tg_username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BotError::storage("user lookup failed", e))?;
        Ok(id)
    }

    pub async fn find_user(&self, tg_username: &str) -> Result<Option<i64>, BotError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE tg_username = ?")
            .bind(tg_username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BotError::storage("user lookup failed", e))?;
        Ok(row.map(|(id,)| id))
    }
}
