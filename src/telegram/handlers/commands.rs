//! Command and message handlers
//!
//! Each handler loads what it needs from the registry, validates, asks the
//! ledger for the mutation, and only then fires best-effort notifications.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use unic_langid::LanguageIdentifier;

use crate::core::config;
use crate::i18n;
use crate::ledger::{self, ActivateOutcome, RechargeOutcome, RemoveOutcome, WithdrawOutcome};
use crate::storage::db::{self, User};
use crate::telegram::menu::{join_group_keyboard, main_menu_keyboard};
use crate::telegram::notifications;

use super::types::HandlerDeps;

/// Extracts a positive integer from the first command argument.
///
/// `/approve 123` → `Some(123)`; missing, non-numeric, and non-positive
/// arguments all read as `None`.
fn parse_positive_argument(text: &str) -> Option<i64> {
    text.split_whitespace()
        .nth(1)
        .and_then(|arg| arg.parse::<i64>().ok())
        .filter(|value| *value > 0)
}

fn is_admin(msg: &Message) -> bool {
    let admin_id = *config::ADMIN_CHAT_ID;
    admin_id != 0 && msg.chat.id.0 == admin_id
}

/// Handles `/start [referrer_id]`.
///
/// Registration is idempotent; the activation-status reply fires either way.
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();
    let user_id = msg.chat.id.0;
    let username = msg.from.as_ref().and_then(|u| u.username.clone());
    let text = msg.text().unwrap_or_default();

    // A malformed payload is dropped rather than stored as a referrer
    let referrer_id = parse_positive_argument(text);

    if let Err(e) = ledger::register(&deps.db_pool, user_id, username, referrer_id) {
        log::error!("Failed to register user {}: {}", user_id, e);
        bot.send_message(msg.chat.id, i18n::t(lang, "operation-failed")).await?;
        return Ok(());
    }

    if ledger::is_activated(&deps.db_pool, user_id) {
        bot.send_message(msg.chat.id, i18n::t(lang, "start-already-active"))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
        return Ok(());
    }

    let mut args = FluentArgs::new();
    args.set("reward", config::fees::REFERRAL_REWARD.to_string());
    args.set("fee", config::fees::ACTIVATION_FEE.to_string());
    args.set("payment_number", config::PAYMENT_NUMBER.clone());
    let welcome = i18n::t_args(lang, "start-welcome", &args);

    let request = bot.send_message(msg.chat.id, welcome);
    match join_group_keyboard(lang) {
        Some(keyboard) => {
            request.reply_markup(keyboard).await?;
        }
        None => {
            request.await?;
        }
    }

    Ok(())
}

/// Handles photo attachments: activation payment proofs.
///
/// The photo is forwarded to the admin together with a ready-to-send
/// `/approve <chat_id>` hint.
pub async fn handle_screenshot(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();
    let user_id = msg.chat.id.0;

    if ledger::is_activated(&deps.db_pool, user_id) {
        bot.send_message(msg.chat.id, i18n::t(lang, "screenshot-already-active"))
            .await?;
        return Ok(());
    }

    match bot
        .forward_message(ChatId(*config::ADMIN_CHAT_ID), msg.chat.id, msg.id)
        .await
    {
        Ok(_) => {
            let mut args = FluentArgs::new();
            args.set("user_id", user_id.to_string());
            notifications::notify_admin_text(bot, &i18n::t_args(lang, "screenshot-admin-hint", &args)).await;

            bot.send_message(msg.chat.id, i18n::t(lang, "screenshot-forwarded"))
                .await?;
        }
        Err(e) => {
            log::error!("Failed to forward activation proof from {}: {}", user_id, e);
            bot.send_message(msg.chat.id, i18n::t(lang, "screenshot-error")).await?;
        }
    }

    Ok(())
}

/// Handles `/approve <chat_id>` (admin only).
pub async fn handle_approve_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();

    if !is_admin(msg) {
        bot.send_message(msg.chat.id, i18n::t(lang, "admin-only")).await?;
        return Ok(());
    }

    let Some(target_id) = parse_positive_argument(msg.text().unwrap_or_default()) else {
        bot.send_message(msg.chat.id, i18n::t(lang, "approve-usage")).await?;
        return Ok(());
    };

    let mut args = FluentArgs::new();
    args.set("user_id", target_id.to_string());

    match ledger::activate(&deps.db_pool, target_id) {
        Ok(ActivateOutcome::Activated { payout }) => {
            // Referral credit is committed; the congratulation is best-effort
            if let Some(payout) = payout {
                let bot_payout = bot.clone();
                tokio::spawn(async move {
                    notifications::notify_referrer_payout(&bot_payout, payout.referrer_id, payout.amount).await;
                });
            }

            match bot
                .send_message(ChatId(target_id), i18n::t(lang, "approve-user-activated"))
                .reply_markup(main_menu_keyboard(lang))
                .await
            {
                Ok(_) => {
                    bot.send_message(msg.chat.id, i18n::t_args(lang, "approve-done", &args))
                        .await?;
                }
                Err(e) => {
                    log::error!("Failed to notify user {} about activation: {}", target_id, e);
                    args.set("error", e.to_string());
                    bot.send_message(msg.chat.id, i18n::t_args(lang, "approve-notify-failed", &args))
                        .await?;
                }
            }
        }
        Ok(ActivateOutcome::AlreadyActive) => {
            bot.send_message(msg.chat.id, i18n::t_args(lang, "approve-already-active", &args))
                .await?;
        }
        Ok(ActivateOutcome::NotFound) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "user-not-found")).await?;
        }
        Err(e) => {
            log::error!("Failed to activate user {}: {}", target_id, e);
            bot.send_message(msg.chat.id, i18n::t(lang, "operation-failed")).await?;
        }
    }

    Ok(())
}

/// Handles `/remove <chat_id>` (admin only).
pub async fn handle_remove_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();

    if !is_admin(msg) {
        bot.send_message(msg.chat.id, i18n::t(lang, "admin-only")).await?;
        return Ok(());
    }

    let Some(target_id) = parse_positive_argument(msg.text().unwrap_or_default()) else {
        bot.send_message(msg.chat.id, i18n::t(lang, "remove-usage")).await?;
        return Ok(());
    };

    match ledger::remove(&deps.db_pool, target_id) {
        Ok(RemoveOutcome::Removed) => {
            let mut args = FluentArgs::new();
            args.set("user_id", target_id.to_string());
            bot.send_message(msg.chat.id, i18n::t_args(lang, "remove-done", &args))
                .await?;
        }
        Ok(RemoveOutcome::NotFound) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "user-not-found")).await?;
        }
        Err(e) => {
            log::error!("Failed to remove user {}: {}", target_id, e);
            bot.send_message(msg.chat.id, i18n::t(lang, "operation-failed")).await?;
        }
    }

    Ok(())
}

/// Handles `/withdraw_amount <amount>`.
pub async fn handle_withdraw_amount_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();
    let user_id = msg.chat.id.0;

    let Some(amount) = parse_positive_argument(msg.text().unwrap_or_default()) else {
        bot.send_message(msg.chat.id, i18n::t(lang, "withdraw-usage")).await?;
        return Ok(());
    };

    match ledger::withdraw(&deps.db_pool, user_id, amount) {
        Ok(WithdrawOutcome::Accepted { .. }) => {
            let bot_alert = bot.clone();
            tokio::spawn(async move {
                notifications::notify_admin_withdraw_request(&bot_alert, user_id, amount).await;
            });

            let mut args = FluentArgs::new();
            args.set("amount", amount.to_string());
            bot.send_message(msg.chat.id, i18n::t_args(lang, "withdraw-accepted", &args))
                .await?;
        }
        Ok(WithdrawOutcome::BelowMinimum { minimum }) => {
            let mut args = FluentArgs::new();
            args.set("minimum", minimum.to_string());
            bot.send_message(msg.chat.id, i18n::t_args(lang, "withdraw-below-min", &args))
                .await?;
        }
        Ok(WithdrawOutcome::InsufficientBalance { .. }) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "withdraw-insufficient"))
                .await?;
        }
        Ok(WithdrawOutcome::NotActivated) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "not-activated")).await?;
        }
        Ok(WithdrawOutcome::NotFound) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "start-required")).await?;
        }
        Err(e) => {
            log::error!("Withdraw failed for user {}: {}", user_id, e);
            bot.send_message(msg.chat.id, i18n::t(lang, "operation-failed")).await?;
        }
    }

    Ok(())
}

/// Handles `/recharge_amount <amount>`.
pub async fn handle_recharge_amount_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();
    let user_id = msg.chat.id.0;

    let Some(amount) = parse_positive_argument(msg.text().unwrap_or_default()) else {
        bot.send_message(msg.chat.id, i18n::t(lang, "recharge-usage")).await?;
        return Ok(());
    };

    match ledger::recharge(&deps.db_pool, user_id, amount) {
        Ok(RechargeOutcome::Accepted) => {
            let bot_alert = bot.clone();
            tokio::spawn(async move {
                notifications::notify_admin_recharge_request(&bot_alert, user_id, amount).await;
            });

            let mut args = FluentArgs::new();
            args.set("amount", amount.to_string());
            bot.send_message(msg.chat.id, i18n::t_args(lang, "recharge-accepted", &args))
                .await?;
        }
        Ok(RechargeOutcome::BelowMinimum { minimum }) => {
            let mut args = FluentArgs::new();
            args.set("minimum", minimum.to_string());
            bot.send_message(msg.chat.id, i18n::t_args(lang, "recharge-below-min", &args))
                .await?;
        }
        Ok(RechargeOutcome::NotActivated) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "not-activated")).await?;
        }
        Ok(RechargeOutcome::NotFound) => {
            bot.send_message(msg.chat.id, i18n::t(lang, "start-required")).await?;
        }
        Err(e) => {
            log::error!("Recharge failed for user {}: {}", user_id, e);
            bot.send_message(msg.chat.id, i18n::t(lang, "operation-failed")).await?;
        }
    }

    Ok(())
}

/// Handles free text: the six menu labels plus the unknown-input fallback.
pub async fn handle_text_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let lang = i18n::bot_lang();
    let user_id = msg.chat.id.0;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    // A failed read degrades to "user not found"
    let user = match db::get_connection(&deps.db_pool) {
        Ok(conn) => match db::get_user(&conn, user_id) {
            Ok(user) => user,
            Err(e) => {
                log::error!("Failed to load user {}: {}", user_id, e);
                None
            }
        },
        Err(e) => {
            log::error!("Failed to get DB connection: {}", e);
            None
        }
    };

    let Some(user) = user else {
        bot.send_message(msg.chat.id, i18n::t(lang, "start-required")).await?;
        return Ok(());
    };

    if text == i18n::t(lang, "menu-profile") {
        let profile = build_profile_text(deps, &user, lang);
        bot.send_message(msg.chat.id, profile)
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else if text == i18n::t(lang, "menu-refer") {
        let reply = match deps.bot_username.as_deref() {
            Some(bot_username) => {
                let mut args = FluentArgs::new();
                args.set("link", format!("https://t.me/{}?start={}", bot_username, user_id));
                i18n::t_args(lang, "refer-link", &args)
            }
            None => {
                log::error!("Bot username unknown; cannot build referral link for {}", user_id);
                i18n::t(lang, "refer-error")
            }
        };
        bot.send_message(msg.chat.id, reply)
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else if text == i18n::t(lang, "menu-withdraw") {
        if !user.activated {
            bot.send_message(msg.chat.id, i18n::t(lang, "not-activated")).await?;
            return Ok(());
        }
        let mut args = FluentArgs::new();
        args.set("balance", user.balance.to_string());
        args.set("minimum", config::fees::MIN_WITHDRAW_AMOUNT.to_string());
        bot.send_message(msg.chat.id, i18n::t_args(lang, "withdraw-info", &args))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else if text == i18n::t(lang, "menu-recharge") {
        if !user.activated {
            bot.send_message(msg.chat.id, i18n::t(lang, "not-activated")).await?;
            return Ok(());
        }
        let mut args = FluentArgs::new();
        args.set("minimum", config::fees::MIN_RECHARGE_AMOUNT.to_string());
        args.set("payment_number", config::PAYMENT_NUMBER.clone());
        bot.send_message(msg.chat.id, i18n::t_args(lang, "recharge-info", &args))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else if text == i18n::t(lang, "menu-history") {
        bot.send_message(msg.chat.id, build_history_text(&user, lang))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else if text == i18n::t(lang, "menu-contact") {
        let mut args = FluentArgs::new();
        args.set("contact", config::CONTACT_HANDLE.clone());
        bot.send_message(msg.chat.id, i18n::t_args(lang, "contact-text", &args))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    } else {
        bot.send_message(msg.chat.id, i18n::t(lang, "unknown"))
            .reply_markup(main_menu_keyboard(lang))
            .await?;
    }

    Ok(())
}

/// Renders the profile reply for a user.
fn build_profile_text(deps: &HandlerDeps, user: &User, lang: &LanguageIdentifier) -> String {
    // Resolve the referrer's display name; a dangling referrer shows as "none"
    let referrer_display = user
        .referrer_id
        .and_then(|referrer_id| {
            let conn = db::get_connection(&deps.db_pool).ok()?;
            db::get_user(&conn, referrer_id).ok().flatten()
        })
        .map(|referrer| {
            format!(
                "@{}",
                referrer.username.unwrap_or_else(|| i18n::t(lang, "profile-no-username"))
            )
        })
        .unwrap_or_else(|| i18n::t(lang, "profile-no-referrer"));

    let mut args = FluentArgs::new();
    args.set(
        "username",
        user.username
            .clone()
            .unwrap_or_else(|| i18n::t(lang, "profile-no-username")),
    );
    args.set("balance", user.balance.to_string());
    args.set("referrer", referrer_display);
    args.set(
        "activated",
        if user.activated {
            i18n::t(lang, "profile-yes")
        } else {
            i18n::t(lang, "profile-no")
        },
    );

    i18n::t_args(lang, "profile-text", &args)
}

/// Renders the transaction-history reply for a user.
fn build_history_text(user: &User, lang: &LanguageIdentifier) -> String {
    let mut text = i18n::t(lang, "history-header");
    text.push_str("\n\n");

    if user.withdraw_history.is_empty() {
        text.push_str(&i18n::t(lang, "history-withdraw-empty"));
    } else {
        text.push_str(&i18n::t(lang, "history-withdraw-header"));
        for amount in &user.withdraw_history {
            let mut args = FluentArgs::new();
            args.set("amount", amount.to_string());
            text.push('\n');
            text.push_str(&i18n::t_args(lang, "history-line", &args));
        }
    }

    text.push_str("\n\n");

    if user.recharge_history.is_empty() {
        text.push_str(&i18n::t(lang, "history-recharge-empty"));
    } else {
        text.push_str(&i18n::t(lang, "history-recharge-header"));
        for amount in &user.recharge_history {
            let mut args = FluentArgs::new();
            args.set("amount", amount.to_string());
            text.push('\n');
            text.push_str(&i18n::t_args(lang, "history-line", &args));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            user_id: 1,
            username: Some("alice".to_string()),
            referrer_id: None,
            activated: true,
            balance: 50,
            withdraw_history: vec![50, 20],
            recharge_history: vec![],
        }
    }

    #[test]
    fn parse_positive_argument_accepts_positive_integers() {
        assert_eq!(parse_positive_argument("/approve 123"), Some(123));
        assert_eq!(parse_positive_argument("/withdraw_amount 50"), Some(50));
    }

    #[test]
    fn parse_positive_argument_rejects_garbage() {
        assert_eq!(parse_positive_argument("/approve"), None);
        assert_eq!(parse_positive_argument("/approve abc"), None);
        assert_eq!(parse_positive_argument("/approve -5"), None);
        assert_eq!(parse_positive_argument("/approve 0"), None);
    }

    #[test]
    fn history_text_lists_amounts_and_empty_sections() {
        let lang = crate::i18n::lang_from_code("en");
        let text = build_history_text(&test_user(), &lang);

        assert!(text.contains("Withdrawals:"));
        assert!(text.contains("- 50 Tk"));
        assert!(text.contains("- 20 Tk"));
        assert!(text.contains("Recharges: no records"));
    }
}
