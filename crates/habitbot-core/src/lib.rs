//! # habitbot-core
//!
//! Core types, traits, configuration, and error handling for habitbot.

pub mod config;
pub mod error;
pub mod event;
pub mod traits;
pub mod update;

pub use config::shellexpand;
