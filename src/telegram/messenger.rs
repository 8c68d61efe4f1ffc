//! [`Messenger`] implemented on top of the Telegram Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatMemberStatus, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
};

use crate::gate::{ButtonKind, GateError, Keyboard, MembershipStatus, MessageRef, Messenger};

/// Thin adapter from the gate's port to teloxide requests
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Convert platform-neutral rows into an inline keyboard
pub fn to_markup(keyboard: Keyboard) -> Result<InlineKeyboardMarkup, GateError> {
    let rows = keyboard
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|button| match button.kind {
                    ButtonKind::Link(link) => url::Url::parse(&link)
                        .map(|url| InlineKeyboardButton::url(button.label, url))
                        .map_err(|e| GateError::InvalidRequest(format!("bad button link '{}': {}", link, e))),
                    ButtonKind::Action(data) => Ok(InlineKeyboardButton::callback(button.label, data)),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InlineKeyboardMarkup::new(rows))
}

/// Wrap the platform-neutral action id back into Telegram's callback id
pub fn callback_query_id(callback_id: &str) -> CallbackQueryId {
    CallbackQueryId(callback_id.to_owned())
}

/// Map Telegram's member status onto the gate's view of it
pub fn membership_from_status(status: ChatMemberStatus) -> MembershipStatus {
    match status {
        ChatMemberStatus::Owner => MembershipStatus::Owner,
        ChatMemberStatus::Administrator => MembershipStatus::Admin,
        ChatMemberStatus::Member => MembershipStatus::Member,
        // Restricted members are not counted, same as left or banned
        _ => MembershipStatus::NotMember,
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if let Some(kb) = keyboard {
            req = req.reply_markup(to_markup(kb)?);
        }
        req.await?;
        Ok(())
    }

    async fn edit_text(&self, message: MessageRef, text: &str, keyboard: Option<Keyboard>) -> Result<(), GateError> {
        let mut req = self
            .bot
            .edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text);
        if let Some(kb) = keyboard {
            req = req.reply_markup(to_markup(kb)?);
        }
        req.await?;
        Ok(())
    }

    async fn answer_action(&self, callback_id: &str, text: Option<&str>) -> Result<(), GateError> {
        let mut req = self.bot.answer_callback_query(callback_query_id(callback_id));
        if let Some(text) = text {
            req = req.text(text);
        }
        req.await?;
        Ok(())
    }

    async fn send_file(&self, chat_id: i64, file_ref: &str, caption: &str) -> Result<(), GateError> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file_id(FileId(file_ref.to_owned())))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn membership(&self, channel_id: i64, user_id: u64) -> Result<MembershipStatus, GateError> {
        let member = self.bot.get_chat_member(ChatId(channel_id), UserId(user_id)).await?;
        Ok(membership_from_status(member.status()))
    }
}
