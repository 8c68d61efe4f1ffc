//! Kinogate - Telegram bot that gates a file catalog behind channel membership
//!
//! A user sends `/start`, joins the listed channels, presses the confirm
//! button and can then redeem short codes for files.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the liveness server
//! - `storage`: the JSON-backed user record store
//! - `gate`: the platform-agnostic gating and redemption flow
//! - `telegram`: teloxide bot setup, dispatcher schema and messenger adapter
//! - `testing`: recording messenger for tests

pub mod cli;
pub mod core;
pub mod gate;
pub mod storage;
pub mod telegram;
pub mod testing;

// Re-export commonly used types for convenience
pub use crate::core::{AppConfig, AppError};
pub use gate::{GateFlow, Messenger};
pub use storage::RecordStore;
