//! Update fetching and the startup identity check.

use super::types::{BotIdentity, TgResponse};
use super::TelegramClient;
use async_trait::async_trait;
use habitbot_core::{
    error::{BotError, ErrorKind},
    traits::UpdateSource,
    update::Update,
};
use serde::de::DeserializeOwned;
use tracing::debug;

impl TelegramClient {
    /// Verify the token by asking the platform who we are.
    pub async fn get_me(&self) -> Result<BotIdentity, BotError> {
        let url = format!("{}/getMe", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::transport("telegram getMe failed", e))?;
        decode::<BotIdentity>(resp, "telegram getMe failed")
            .await?
            .ok_or_else(|| BotError::new(ErrorKind::Api, "telegram getMe returned no result"))
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: i64, limit: usize) -> Result<Vec<Update>, BotError> {
        let url = self.updates_url(offset, limit);
        let resp = self
            .client
            .get(&url)
            .timeout(self.poll_request_timeout())
            .send()
            .await
            .map_err(|e| BotError::transport("can't get events", e))?;

        let updates = decode::<Vec<Update>>(resp, "can't get events")
            .await?
            .unwrap_or_default();
        debug!("telegram getUpdates: offset={offset} received={}", updates.len());
        Ok(updates)
    }
}

/// Read and decode a Bot API envelope.
async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    context: &str,
) -> Result<Option<T>, BotError> {
    let body: TgResponse<T> = resp.json().await.map_err(|e| {
        let kind = if e.is_decode() {
            ErrorKind::Api
        } else {
            ErrorKind::Transport
        };
        BotError::new(kind, context).with_source(e)
    })?;
    envelope_result(body, context)
}

/// Map `ok = false` to an API error carrying the platform's description.
pub(crate) fn envelope_result<T>(body: TgResponse<T>, context: &str) -> Result<Option<T>, BotError> {
    if !body.ok {
        let description = body
            .description
            .unwrap_or_else(|| "no description".to_string());
        return Err(BotError::new(ErrorKind::Api, context).with_source(description));
    }
    Ok(body.result)
}
