//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{sender_from_user, HandlerDeps, HandlerError};
use crate::gate::{MessageRef, RedeemOutcome, StartOutcome};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched before plain text so `/start` never reaches the code
/// lookup. Every endpoint returns `Ok(())`: failures are handled inside the
/// flow and must not stop the dispatcher.
///
/// # Arguments
/// * `deps` - Handler dependencies
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler(deps_commands))
        // Plain text is a code
        .branch(message_handler(deps_messages))
        // Callback query handler (inline keyboard buttons)
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .filter_command::<Command>()
        .endpoint(move |msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let sender = sender_from_user(user, msg.chat.id);
                log::info!("🎯 Received command: {:?} from {}", cmd, sender.id);

                match cmd {
                    Command::Start => match deps.flow.start(&sender).await {
                        StartOutcome::Prompted => log::debug!("Channel prompt shown to {}", sender.id),
                        StartOutcome::AlreadyConfirmed => log::debug!("{} is already confirmed", sender.id),
                    },
                }
                Ok::<(), HandlerError>(())
            }
        })
}

/// Handler for regular text messages in private chats
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .filter_map(|msg: Message| msg.text().map(str::to_owned))
        .endpoint(move |msg: Message, text: String| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let sender = sender_from_user(user, msg.chat.id);

                if let RedeemOutcome::NotConfirmed = deps.flow.redeem(&sender, &text).await {
                    log::debug!("{} sent text before confirming", sender.id);
                }
                Ok::<(), HandlerError>(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let action = q.data.clone().unwrap_or_default();
            let origin = q.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat().id.0,
                message_id: m.id().0,
            });
            // Without the button's message, answer in the user's private chat
            let chat = origin.map_or_else(|| ChatId::from(q.from.id), |m| ChatId(m.chat_id));
            let sender = sender_from_user(&q.from, chat);

            let outcome = deps.flow.confirm(&sender, &q.id.0, &action, origin).await;
            log::info!("Confirmation attempt by {}: {:?}", sender.id, outcome);
            Ok::<(), HandlerError>(())
        }
    })
}
