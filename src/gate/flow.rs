//! Onboarding, membership confirmation and code redemption
//!
//! Every operation reloads the record store; the conversation state is
//! derived from the stored record, so a restart never loses track of where
//! a user is. Platform failures degrade to fixed fallbacks and are logged:
//!
//! - store load failure → empty store
//! - store save failure → logged, the flow carries on
//! - membership query failure → "not joined"
//! - file delivery failure → logged, no admin notice
//! - admin notification failure → logged, delivery stands

use std::sync::Arc;

use crate::core::config::{AppConfig, Catalog, Channel};
use crate::storage::{RecordStore, UserRecord};

use super::messages::{self, CONFIRM_ACTION};
use super::messenger::{Keyboard, MessageRef, Messenger};

/// Where a user currently is in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Never attempted confirmation
    New,
    /// Has a record that is not confirmed yet
    AwaitingConfirmation,
    /// Confirmed, every text is treated as a code
    AwaitingCode,
}

impl ConversationState {
    pub fn of(record: Option<UserRecord>) -> Self {
        match record {
            None => Self::New,
            Some(r) if r.confirmed => Self::AwaitingCode,
            Some(_) => Self::AwaitingConfirmation,
        }
    }
}

/// Who triggered an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    /// Chat the event came from; replies go here
    pub chat_id: i64,
    pub display_name: String,
}

impl Sender {
    pub fn new(id: u64, chat_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            chat_id,
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Channel list with the "I have joined" button was shown
    Prompted,
    /// User is already confirmed and was asked for a code
    AlreadyConfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Every channel checked out; `newly` is false on repeated presses
    Confirmed { newly: bool },
    /// Ids of the channels still missing, in configuration order
    Missing(Vec<i64>),
    /// The button carried an action id this flow does not know
    UnknownAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    Delivered { code: String },
    /// The file could not be sent; the admin is not notified
    DeliveryFailed { code: String },
    InvalidCode,
    NotConfirmed,
}

/// The gating flow, shared by all handlers
pub struct GateFlow {
    messenger: Arc<dyn Messenger>,
    store: Arc<RecordStore>,
    channels: Vec<Channel>,
    catalog: Catalog,
    admin_id: Option<i64>,
}

impl GateFlow {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        store: Arc<RecordStore>,
        channels: Vec<Channel>,
        catalog: Catalog,
        admin_id: Option<i64>,
    ) -> Self {
        Self {
            messenger,
            store,
            channels,
            catalog,
            admin_id,
        }
    }

    pub fn from_config(messenger: Arc<dyn Messenger>, store: Arc<RecordStore>, config: &AppConfig) -> Self {
        Self::new(
            messenger,
            store,
            config.channels.clone(),
            config.catalog.clone(),
            config.admin_id,
        )
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub async fn state(&self, user_id: u64) -> ConversationState {
        ConversationState::of(self.store.get(user_id).await)
    }

    /// `/start`: skip straight to codes for confirmed users, otherwise show the channels
    pub async fn start(&self, sender: &Sender) -> StartOutcome {
        if self.state(sender.id).await == ConversationState::AwaitingCode {
            self.reply(sender, messages::ALREADY_CONFIRMED).await;
            return StartOutcome::AlreadyConfirmed;
        }

        let keyboard = messages::channel_keyboard(&self.channels, messages::JOINED_BUTTON);
        if let Err(e) = self
            .messenger
            .send_text(sender.chat_id, messages::WELCOME, Some(keyboard))
            .await
        {
            log::error!("Failed to send channel prompt to {}: {}", sender.id, e);
        }
        StartOutcome::Prompted
    }

    /// "I have joined" / re-check button
    ///
    /// `origin` is the message carrying the button; it is edited in place
    /// when known, otherwise a new message is sent.
    pub async fn confirm(
        &self,
        sender: &Sender,
        callback_id: &str,
        action: &str,
        origin: Option<MessageRef>,
    ) -> ConfirmOutcome {
        if action != CONFIRM_ACTION {
            log::debug!("Ignoring unknown action '{}' from {}", action, sender.id);
            self.answer(callback_id, None).await;
            return ConfirmOutcome::UnknownAction;
        }

        let missing = self.missing_channels(sender.id).await;
        if !missing.is_empty() {
            let text = messages::not_joined_text(&missing);
            let keyboard = messages::channel_keyboard(missing.iter().copied(), messages::RECHECK_BUTTON);
            self.show(sender, origin, &text, Some(keyboard)).await;
            self.answer(callback_id, None).await;
            return ConfirmOutcome::Missing(missing.iter().map(|ch| ch.id).collect());
        }

        let (already, saved) = self
            .store
            .update(sender.id, |r| std::mem::replace(&mut r.confirmed, true))
            .await;
        match saved {
            Ok(()) if !already => log::info!("User {} confirmed all channels", sender.id),
            Ok(()) => {}
            Err(e) => log::error!("Failed to persist confirmation of {}: {}", sender.id, e),
        }

        let text = messages::confirmed_text(&self.catalog);
        self.show(sender, origin, &text, None).await;
        self.answer(callback_id, Some(messages::CONFIRMED_TOAST)).await;

        ConfirmOutcome::Confirmed { newly: !already }
    }

    /// Plain text: treat it as a code once the user is confirmed
    pub async fn redeem(&self, sender: &Sender, text: &str) -> RedeemOutcome {
        if self.state(sender.id).await != ConversationState::AwaitingCode {
            self.reply(sender, messages::SUBSCRIBE_FIRST).await;
            return RedeemOutcome::NotConfirmed;
        }

        let code = text.trim();
        let Some(file_ref) = self.catalog.file_for(code) else {
            self.reply(sender, &messages::invalid_code_text(&self.catalog)).await;
            return RedeemOutcome::InvalidCode;
        };

        if let Err(e) = self
            .messenger
            .send_file(sender.chat_id, file_ref, &self.catalog.caption)
            .await
        {
            log::error!("Failed to deliver code {} to {}: {}", code, sender.id, e);
            return RedeemOutcome::DeliveryFailed { code: code.to_string() };
        }
        log::info!("Delivered code {} to {}", code, sender.id);

        self.notify_admin(sender, code).await;

        RedeemOutcome::Delivered { code: code.to_string() }
    }

    /// Channels the user is not verifiably in; query failures count as missing
    async fn missing_channels(&self, user_id: u64) -> Vec<&Channel> {
        let mut missing = Vec::new();
        for channel in &self.channels {
            match self.messenger.membership(channel.id, user_id).await {
                Ok(status) if status.is_joined() => {}
                Ok(status) => {
                    log::debug!("User {} is {:?} in {}", user_id, status, channel.id);
                    missing.push(channel);
                }
                Err(e) => {
                    log::warn!("Membership check of {} in {} failed: {}", user_id, channel.id, e);
                    missing.push(channel);
                }
            }
        }
        missing
    }

    async fn notify_admin(&self, sender: &Sender, code: &str) {
        let Some(admin_id) = self.admin_id else {
            return;
        };
        let text = messages::admin_redeemed_text(&sender.display_name, sender.id, code);
        if let Err(e) = self.messenger.send_text(admin_id, &text, None).await {
            log::error!("Failed to send admin notification: {}", e);
        }
    }

    async fn reply(&self, sender: &Sender, text: &str) {
        if let Err(e) = self.messenger.send_text(sender.chat_id, text, None).await {
            log::error!("Failed to reply to {}: {}", sender.id, e);
        }
    }

    async fn show(&self, sender: &Sender, origin: Option<MessageRef>, text: &str, keyboard: Option<Keyboard>) {
        let result = match origin {
            Some(message) => self.messenger.edit_text(message, text, keyboard).await,
            None => self.messenger.send_text(sender.chat_id, text, keyboard).await,
        };
        if let Err(e) = result {
            log::warn!("Failed to update prompt for {}: {}", sender.id, e);
        }
    }

    async fn answer(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.messenger.answer_action(callback_id, text).await {
            log::warn!("Failed to answer callback {}: {}", callback_id, e);
        }
    }
}
