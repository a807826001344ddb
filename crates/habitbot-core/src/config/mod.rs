mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::BotError;
use defaults::*;

/// Env var that overrides `telegram.bot_token`.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level habitbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub dialog: DialogConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram Bot API and consumer loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_tg_host")]
    pub host: String,
    /// Maximum number of updates requested per fetch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Pause after a fetch that returned no updates.
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
    /// Upper bound of the exponential back-off after fetch errors.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            host: default_tg_host(),
            batch_size: default_batch_size(),
            poll_timeout_secs: default_poll_timeout(),
            idle_backoff_ms: default_idle_backoff_ms(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl TelegramConfig {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

/// Habit-creation dialog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Idle time after which an open dialog is abandoned.
    #[serde(default = "default_dialog_timeout")]
    pub timeout_secs: u64,
    /// Capacity of the coordinator's inbound channel. Input beyond it is dropped.
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,
    /// How long the HTTP adapter waits for the coordinator to answer a query.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_dialog_timeout(),
            inbox_capacity: default_inbox_capacity(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl DialogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// HTTP adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token for API authentication. Empty = no auth (for local-only use).
    #[serde(default)]
    pub api_key: String,
    /// Bound on how long shutdown waits for running tasks.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_api_host(),
            port: default_api_port(),
            api_key: String::new(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Habit store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Config {
    /// Reject settings the bot cannot run with.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(BotError::config(format!(
                "telegram bot_token is empty; set it in config.toml or the {TOKEN_ENV} env var"
            )));
        }
        if self.telegram.batch_size == 0 {
            return Err(BotError::config("telegram batch_size must be greater than 0"));
        }
        if self.dialog.inbox_capacity == 0 {
            return Err(BotError::config("dialog inbox_capacity must be greater than 0"));
        }
        Ok(())
    }

    /// Override file values with environment variables.
    fn apply_env(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, BotError> {
    let mut config = read(Path::new(path))?;
    config.apply_env(std::env::var(TOKEN_ENV).ok());
    Ok(config)
}

fn read(path: &Path) -> Result<Config, BotError> {
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        BotError::config(format!("failed to read {}", path.display())).with_source(e)
    })?;

    toml::from_str(&content)
        .map_err(|e| BotError::config("failed to parse config").with_source(e))
}
