//! Fire-and-forget notification fan-out
//!
//! Delivery is best-effort: failures are logged, never retried, and never
//! roll back the registry write that triggered them. Callers dispatch these
//! only after the write has committed.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;

use crate::core::config;
use crate::i18n;

/// Sends a plain text message to the admin identity.
pub async fn notify_admin_text(bot: &Bot, text: &str) {
    let admin_id = *config::ADMIN_CHAT_ID;
    if admin_id == 0 {
        log::warn!("ADMIN_CHAT_ID not set; dropping admin notification: {}", text);
        return;
    }

    if let Err(e) = bot.send_message(ChatId(admin_id), text).await {
        log::error!("Failed to notify admin: {}", e);
    }
}

/// Alerts the admin about a freshly recorded withdraw request.
pub async fn notify_admin_withdraw_request(bot: &Bot, user_id: i64, amount: i64) {
    let lang = i18n::bot_lang();
    let mut args = FluentArgs::new();
    args.set("user_id", user_id.to_string());
    args.set("amount", amount.to_string());

    notify_admin_text(bot, &i18n::t_args(lang, "withdraw-admin-alert", &args)).await;
}

/// Alerts the admin about a freshly recorded recharge request.
pub async fn notify_admin_recharge_request(bot: &Bot, user_id: i64, amount: i64) {
    let lang = i18n::bot_lang();
    let mut args = FluentArgs::new();
    args.set("user_id", user_id.to_string());
    args.set("amount", amount.to_string());

    notify_admin_text(bot, &i18n::t_args(lang, "recharge-admin-alert", &args)).await;
}

/// Congratulates a referrer on their one-time activation payout.
pub async fn notify_referrer_payout(bot: &Bot, referrer_id: i64, amount: i64) {
    let lang = i18n::bot_lang();
    let mut args = FluentArgs::new();
    args.set("amount", amount.to_string());

    if let Err(e) = bot
        .send_message(ChatId(referrer_id), i18n::t_args(lang, "referral-payout", &args))
        .await
    {
        log::error!("Failed to notify referrer {} about payout: {}", referrer_id, e);
    }
}

/// Tells the admin the bot (re)started.
pub async fn notify_admin_startup(bot: &Bot, bot_username: Option<&str>) {
    let lang = i18n::bot_lang();
    let mut args = FluentArgs::new();
    args.set("bot", bot_username.unwrap_or("unknown").to_string());

    notify_admin_text(bot, &i18n::t_args(lang, "admin-startup", &args)).await;
}
