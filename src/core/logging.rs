//! Logging initialization and startup configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the payment/admin configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the payment/admin configuration at application startup
///
/// Validates and logs:
/// - ADMIN_CHAT_ID presence (admin commands are dead without it)
/// - PAYMENT_NUMBER and GROUP_LINK presence
/// - The four monetary constants
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Configuration check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if *config::ADMIN_CHAT_ID != 0 {
        log::info!("✅ ADMIN_CHAT_ID: {}", *config::ADMIN_CHAT_ID);
    } else {
        log::error!("❌ ADMIN_CHAT_ID not set - /approve and /remove will be refused");
    }

    if config::PAYMENT_NUMBER.is_empty() {
        log::warn!("⚠️  PAYMENT_NUMBER not set - activation instructions will show an empty number");
    } else {
        log::info!("✅ PAYMENT_NUMBER: {}", config::PAYMENT_NUMBER.as_str());
    }

    if config::GROUP_LINK.is_empty() {
        log::warn!("⚠️  GROUP_LINK not set - the join-group button will be hidden");
    } else {
        log::info!("✅ GROUP_LINK: {}", config::GROUP_LINK.as_str());
    }

    log::info!(
        "Amounts: activation fee {}, referral reward {}, min withdraw {}, min recharge {}",
        *config::fees::ACTIVATION_FEE,
        *config::fees::REFERRAL_REWARD,
        *config::fees::MIN_WITHDRAW_AMOUNT,
        *config::fees::MIN_RECHARGE_AMOUNT
    );
    log::info!("Language: {}", config::BOT_LANG.as_str());
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
