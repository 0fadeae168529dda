use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use takabot::cli::{Cli, Commands};
use takabot::core::{config, init_logger, log_startup_configuration, web_server};
use takabot::storage::create_pool;
use takabot::telegram::notifications::notify_admin_startup;
use takabot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration,
/// database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Catch panics in the dispatcher so we can log them instead of dying silently
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Load environment variables from .env before any config static is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();

    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }
    if *config::ADMIN_CHAT_ID == 0 {
        return Err(anyhow::anyhow!("ADMIN_CHAT_ID environment variable not set"));
    }

    let bot = create_bot()?;

    // Fetch bot identity; retry while the Bot API is still starting up
    let bot_info = {
        let startup_max_retries = 12;
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    startup_retry += 1;
                    if startup_retry >= startup_max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} retries: {}",
                            startup_retry,
                            e
                        ));
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        startup_retry,
                        startup_max_retries,
                        e
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_info.id);

    setup_bot_commands(&bot).await?;
    notify_admin_startup(&bot, bot_username.as_deref()).await;

    // Create database connection pool
    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    // Start the liveness endpoint
    if *config::health::ENABLED {
        let health_port = *config::health::PORT;
        tokio::spawn(async move {
            if let Err(e) = web_server::start_web_server(health_port).await {
                log::error!("Health server error: {}", e);
            }
        });
    } else {
        log::info!("Health endpoint disabled (HEALTH_ENABLED=false)");
    }

    // Create the dispatcher handler tree
    let deps = HandlerDeps::new(Arc::clone(&db_pool), bot_username);
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");

    use teloxide::update_listeners::Polling;
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
