//! In-memory registry of Telegram users seen by the bot.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Canonical form of a Telegram username: no `@`, lowercase.
pub fn normalize_username(name: &str) -> String {
    name.trim().trim_start_matches('@').to_lowercase()
}

/// Usernames that have messaged the bot during this process lifetime.
///
/// Written by the command processor, read by HTTP handlers on arbitrary
/// worker threads.
#[derive(Clone, Default)]
pub struct KnownUsers {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl KnownUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, username: &str) {
        let name = normalize_username(username);
        if name.is_empty() {
            return;
        }
        let mut users = self.inner.write().unwrap_or_else(|e| e.into_inner());
        users.insert(name);
    }

    pub fn contains(&self, username: &str) -> bool {
        let users = self.inner.read().unwrap_or_else(|e| e.into_inner());
        users.contains(&normalize_username(username))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("@Ann"), "ann");
        assert_eq!(normalize_username("  bob "), "bob");
    }

    #[test]
    fn test_record_and_contains_ignore_case_and_at() {
        let users = KnownUsers::new();
        assert!(!users.contains("ann"));
        users.record("Ann");
        assert!(users.contains("@ann"));
        assert!(users.contains("ANN"));
        users.record("ann");
        users.record("");
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let users = KnownUsers::new();
        let reader = users.clone();
        users.record("carol");
        assert!(reader.contains("carol"));
    }
}
