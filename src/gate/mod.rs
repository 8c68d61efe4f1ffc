//! Channel gate: onboarding, membership confirmation and code redemption
//!
//! This module has no teloxide dependency beyond error conversion; the
//! platform is reached through the [`Messenger`] port.

pub mod flow;
pub mod messages;
pub mod messenger;

use thiserror::Error;

pub use flow::{ConfirmOutcome, ConversationState, GateFlow, RedeemOutcome, Sender, StartOutcome};
pub use messenger::{Button, ButtonKind, Keyboard, MembershipStatus, MessageRef, Messenger};

/// Failure of a call to the messaging platform
#[derive(Error, Debug)]
pub enum GateError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Request could not be built (bad link, unusable id)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else reported by a platform implementation
    #[error("Platform error: {0}")]
    Platform(String),
}
