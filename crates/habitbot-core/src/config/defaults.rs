//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "habitbot".to_string()
}

pub fn default_data_dir() -> String {
    "~/.habitbot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_tg_host() -> String {
    "api.telegram.org".to_string()
}

pub fn default_batch_size() -> usize {
    100
}

pub fn default_poll_timeout() -> u64 {
    30
}

pub fn default_idle_backoff_ms() -> u64 {
    1000
}

pub fn default_max_backoff() -> u64 {
    60
}

pub fn default_dialog_timeout() -> u64 {
    300
}

pub fn default_inbox_capacity() -> usize {
    16
}

pub fn default_query_timeout_ms() -> u64 {
    2000
}

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    8000
}

pub fn default_shutdown_timeout() -> u64 {
    5
}

pub fn default_db_path() -> String {
    "~/.habitbot/data/habits.db".to_string()
}
