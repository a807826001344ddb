//! Telegram Bot API client.
//!
//! Long polling via `getUpdates`, replies via `sendMessage`.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
pub(crate) mod types;

pub use types::BotIdentity;


use habitbot_core::config::TelegramConfig;
use std::time::Duration;
use tracing::warn;

/// Telegram texts longer than this are rejected by `sendMessage`.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Bound on every request except long polls, which set their own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client over the Bot API. Stateless apart from the HTTP pool:
/// the update offset belongs to whoever drives `fetch`.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// Create a new client from config.
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_base_url(
            format!("https://{}/bot{}", config.host, config.bot_token),
            config.poll_timeout_secs,
        )
    }

    pub(crate) fn with_base_url(base_url: String, poll_timeout_secs: u64) -> Self {
        Self::with_timeouts(base_url, poll_timeout_secs, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeouts(
        base_url: String,
        poll_timeout_secs: u64,
        request_timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("can't build configured HTTP client, using defaults: {e}");
                reqwest::Client::new()
            });
        Self {
            client,
            base_url,
            poll_timeout_secs,
        }
    }

    /// Request timeout for long polls: the server holds the request for
    /// `poll_timeout_secs`, so allow a little extra for the round trip.
    fn poll_request_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs + 5)
    }

    fn updates_url(&self, offset: i64, limit: usize) -> String {
        format!(
            "{}/getUpdates?offset={offset}&limit={limit}&timeout={}",
            self.base_url, self.poll_timeout_secs
        )
    }
}
