//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{
    handle_approve_command, handle_recharge_amount_command, handle_remove_command, handle_screenshot,
    handle_start_command, handle_text_message, handle_withdraw_amount_command,
};
use super::types::{HandlerDeps, HandlerError};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in tests.
///
/// Branch order matters: the slash commands are matched first, then photo
/// attachments (activation proofs), then free text against the menu labels.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_start = deps.clone();
    let deps_approve = deps.clone();
    let deps_remove = deps.clone();
    let deps_withdraw = deps.clone();
    let deps_recharge = deps.clone();
    let deps_screenshot = deps.clone();
    let deps_messages = deps.clone();

    dptree::entry()
        .branch(start_handler(deps_start))
        .branch(approve_handler(deps_approve))
        .branch(remove_handler(deps_remove))
        .branch(withdraw_amount_handler(deps_withdraw))
        .branch(recharge_amount_handler(deps_recharge))
        .branch(screenshot_handler(deps_screenshot))
        .branch(message_handler(deps_messages))
}

fn text_starts_with(msg: &Message, prefix: &str) -> bool {
    msg.text().map(|text| text.starts_with(prefix)).unwrap_or(false)
}

/// Handler for /start, optionally carrying a referrer id as payload
fn start_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| text_starts_with(&msg, "/start"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_start_command(&bot, &msg, &deps).await {
                    log::error!("/start handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for the /approve admin command
fn approve_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| text_starts_with(&msg, "/approve"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_approve_command(&bot, &msg, &deps).await {
                    log::error!("/approve handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for the /remove admin command
fn remove_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| text_starts_with(&msg, "/remove"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_remove_command(&bot, &msg, &deps).await {
                    log::error!("/remove handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for /withdraw_amount <amount>
fn withdraw_amount_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| text_starts_with(&msg, "/withdraw_amount"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_withdraw_amount_command(&bot, &msg, &deps).await {
                    log::error!("/withdraw_amount handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for /recharge_amount <amount>
fn recharge_amount_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| text_starts_with(&msg, "/recharge_amount"))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_recharge_amount_command(&bot, &msg, &deps).await {
                    log::error!("/recharge_amount handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for photo attachments (activation payment proofs)
fn screenshot_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.photo().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_screenshot(&bot, &msg, &deps).await {
                    log::error!("Screenshot handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for free text (menu labels and the unknown-input fallback)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_text_message(&bot, &msg, &deps).await {
                    log::error!("Message handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}
