use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
///
/// Everything is read once at startup from the environment; none of it is
/// user-configurable at runtime.
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Admin chat identity
/// Read from ADMIN_CHAT_ID environment variable
/// Defaults to 0 if not set (admin commands and notifications disabled)
pub static ADMIN_CHAT_ID: Lazy<i64> = Lazy::new(|| {
    env::var("ADMIN_CHAT_ID")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
});

/// Mobile payment number users transfer the activation fee to
/// Read from PAYMENT_NUMBER environment variable
pub static PAYMENT_NUMBER: Lazy<String> =
    Lazy::new(|| env::var("PAYMENT_NUMBER").unwrap_or_else(|_| String::new()));

/// Invite link to the proof-of-earnings group, shown pre-activation
/// Read from GROUP_LINK environment variable
/// Empty or unparseable value disables the inline join button
pub static GROUP_LINK: Lazy<String> = Lazy::new(|| env::var("GROUP_LINK").unwrap_or_else(|_| String::new()));

/// Support contact shown behind the contact menu button
/// Read from CONTACT_HANDLE environment variable
pub static CONTACT_HANDLE: Lazy<String> =
    Lazy::new(|| env::var("CONTACT_HANDLE").unwrap_or_else(|_| "@support".to_string()));

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: database.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "database.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Operator language for all outbound text
/// Read from BOT_LANG environment variable
/// Default: bn
pub static BOT_LANG: Lazy<String> = Lazy::new(|| env::var("BOT_LANG").unwrap_or_else(|_| "bn".to_string()));

fn env_amount(name: &str, default: i64) -> i64 {
    env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Monetary constants, all in whole taka
pub mod fees {
    use once_cell::sync::Lazy;

    use super::env_amount;

    /// Flat fee a user pays (out of band) to get activated
    /// Read from ACTIVATION_FEE environment variable
    pub static ACTIVATION_FEE: Lazy<i64> = Lazy::new(|| env_amount("ACTIVATION_FEE", 50));

    /// Reward credited to the referrer when a referred user is activated
    /// Read from REFERRAL_REWARD environment variable
    pub static REFERRAL_REWARD: Lazy<i64> = Lazy::new(|| env_amount("REFERRAL_REWARD", 20));

    /// Smallest amount accepted by /withdraw_amount
    /// Read from MIN_WITHDRAW_AMOUNT environment variable
    pub static MIN_WITHDRAW_AMOUNT: Lazy<i64> = Lazy::new(|| env_amount("MIN_WITHDRAW_AMOUNT", 50));

    /// Smallest amount accepted by /recharge_amount
    /// Read from MIN_RECHARGE_AMOUNT environment variable
    pub static MIN_RECHARGE_AMOUNT: Lazy<i64> = Lazy::new(|| env_amount("MIN_RECHARGE_AMOUNT", 20));
}

/// Health endpoint configuration
pub mod health {
    use once_cell::sync::Lazy;
    use std::env;

    /// Enable the liveness HTTP endpoint
    /// Read from HEALTH_ENABLED environment variable
    /// Default: true
    pub static ENABLED: Lazy<bool> = Lazy::new(|| {
        env::var("HEALTH_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    });

    /// Port for the liveness HTTP endpoint
    /// Read from HEALTH_PORT environment variable
    /// Default: 8080
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("HEALTH_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
