//! In-memory [`Messenger`] that records outbound calls

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gate::{GateError, Keyboard, MembershipStatus, MessageRef, Messenger};

/// One recorded outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text {
        chat_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Edit {
        message: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
    },
    File {
        chat_id: i64,
        file_ref: String,
        caption: String,
    },
}

#[derive(Default)]
struct Inner {
    outbound: Vec<Outbound>,
    membership: HashMap<i64, MembershipStatus>,
    failing_channels: HashSet<i64>,
    failing_chats: HashSet<i64>,
}

/// Records successful calls; failed ones return an error and are not recorded
#[derive(Default)]
pub struct RecordingMessenger {
    inner: Mutex<Inner>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the membership answer for a channel (unscripted channels report `NotMember`)
    pub fn set_membership(&self, channel_id: i64, status: Result<MembershipStatus, ()>) {
        let mut inner = self.lock();
        match status {
            Ok(status) => {
                inner.failing_channels.remove(&channel_id);
                inner.membership.insert(channel_id, status);
            }
            Err(()) => {
                inner.failing_channels.insert(channel_id);
            }
        }
    }

    /// Make membership queries for a channel fail
    pub fn fail_membership(&self, channel_id: i64) {
        self.set_membership(channel_id, Err(()));
    }

    /// Make every send to `chat_id` fail
    pub fn fail_sends_to(&self, chat_id: i64) {
        self.lock().failing_chats.insert(chat_id);
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut self.lock().outbound)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, chat_id: Option<i64>, call: Outbound) -> Result<(), GateError> {
        let mut inner = self.lock();
        if let Some(chat_id) = chat_id {
            if inner.failing_chats.contains(&chat_id) {
                return Err(GateError::Platform(format!("chat {} unreachable", chat_id)));
            }
        }
        inner.outbound.push(call);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError> {
        self.record(
            Some(chat_id),
            Outbound::Text {
                chat_id,
                text: text.to_string(),
                keyboard,
            },
        )
    }

    async fn edit_text(&self, message: MessageRef, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError> {
        self.record(
            Some(message.chat_id),
            Outbound::Edit {
                message,
                text: text.to_string(),
                keyboard,
            },
        )
    }

    async fn answer_action(&self, callback_id: &str, text: Option<&str>) -> Result<(), GateError> {
        self.record(
            None,
            Outbound::Answer {
                callback_id: callback_id.to_string(),
                text: text.map(str::to_string),
            },
        )
    }

    async fn send_file(&self, chat_id: i64, file_ref: &str, caption: &str) -> Result<(), GateError> {
        self.record(
            Some(chat_id),
            Outbound::File {
                chat_id,
                file_ref: file_ref.to_string(),
                caption: caption.to_string(),
            },
        )
    }

    async fn membership(&self, channel_id: i64, _user_id: u64) -> Result<MembershipStatus, GateError> {
        let inner = self.lock();
        if inner.failing_channels.contains(&channel_id) {
            return Err(GateError::Platform(format!("membership of {} unavailable", channel_id)));
        }
        Ok(inner
            .membership
            .get(&channel_id)
            .copied()
            .unwrap_or(MembershipStatus::NotMember))
    }
}
