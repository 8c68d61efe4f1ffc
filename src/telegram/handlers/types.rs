//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{ChatId, User};

use crate::gate::{GateFlow, Sender};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub flow: Arc<GateFlow>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(flow: Arc<GateFlow>) -> Self {
        Self { flow }
    }
}

/// Extract the gate's view of a Telegram user writing from `chat`
pub fn sender_from_user(user: &User, chat: ChatId) -> Sender {
    Sender::new(user.id.0, chat.0, user.full_name())
}
