//! Message sending and command registration.

use super::{TelegramClient, MAX_MESSAGE_LEN};
use crate::utils::split_message;
use async_trait::async_trait;
use habitbot_core::{
    error::{BotError, ErrorKind},
    traits::ChatSender,
};
use tracing::{info, warn};

impl TelegramClient {
    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub async fn register_commands(&self, commands: &[(&str, &str)]) {
        let commands: Vec<_> = commands
            .iter()
            .map(|(command, description)| {
                serde_json::json!({
                    "command": command.trim_start_matches('/'),
                    "description": description,
                })
            })
            .collect();
        let body = serde_json::json!({ "commands": commands });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    /// Send plain text to a chat, split into Telegram-sized chunks.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        let url = format!("{}/sendMessage", self.base_url);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| BotError::transport("telegram send failed", e))?;

            let status = resp.status();
            if !status.is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                return Err(BotError::new(
                    ErrorKind::Api,
                    format!("telegram send failed ({status})"),
                )
                .with_source(error_text));
            }
        }

        Ok(())
    }
}
