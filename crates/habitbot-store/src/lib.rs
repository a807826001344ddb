//! # habitbot-store
//!
//! Persistent habit storage for habitbot (SQLite-backed).

pub mod store;

pub use store::{Habit, Store};
