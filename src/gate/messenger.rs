//! Outbound port to the messaging platform
//!
//! The gating flow only ever talks to the platform through [`Messenger`], so
//! it has no teloxide dependency and can be driven by a recording fake in
//! tests. The Telegram implementation lives in `crate::telegram::messenger`.

use async_trait::async_trait;

use super::GateError;

/// What a button does when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    /// Opens an external link
    Link(String),
    /// Sends an opaque action id back to the bot
    Action(String),
}

/// A labeled inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

impl Button {
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Link(url.into()),
        }
    }

    pub fn action(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Action(action_id.into()),
        }
    }
}

/// Rows of buttons attached under a message
pub type Keyboard = Vec<Vec<Button>>;

/// A message previously sent by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Membership of a user in a channel as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    Admin,
    Owner,
    /// Left, kicked, restricted or never joined
    NotMember,
}

impl MembershipStatus {
    pub fn is_joined(self) -> bool {
        matches!(self, Self::Member | Self::Admin | Self::Owner)
    }
}

/// Operations the flow needs from the platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, optionally with inline buttons
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError>;

    /// Replace the text (and buttons) of a message the bot sent earlier
    async fn edit_text(&self, message: MessageRef, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError>;

    /// Dismiss the loading indicator of a pressed button, optionally with a toast
    async fn answer_action(&self, callback_id: &str, text: Option<&str>) -> Result<(), GateError>;

    /// Send a stored file by its platform reference with a caption
    async fn send_file(&self, chat_id: i64, file_ref: &str, caption: &str) -> Result<(), GateError>;

    /// Query whether `user_id` is in `channel_id`
    async fn membership(&self, channel_id: i64, user_id: u64) -> Result<MembershipStatus, GateError>;
}
