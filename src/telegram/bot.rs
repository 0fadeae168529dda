//! Bot initialization and command registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::core::config;
use crate::i18n;

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, client build failure)
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        Bot::with_client(config::BOT_TOKEN.clone(), client).set_api_url(url)
    } else {
        Bot::with_client(config::BOT_TOKEN.clone(), client)
    };

    Ok(bot)
}

/// Sets up bot commands in the Telegram UI
///
/// Only `/start` is advertised; the argument-carrying commands
/// (`/withdraw_amount`, `/recharge_amount`) and the admin commands are
/// hinted in replies instead.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let lang = i18n::bot_lang();

    bot.set_my_commands(vec![BotCommand::new("start", i18n::t(lang, "command-start-desc"))])
        .await?;

    Ok(())
}
