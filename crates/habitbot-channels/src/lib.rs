//! # habitbot-channels
//!
//! Messaging platform integration for habitbot.

pub mod telegram;
pub mod utils;
