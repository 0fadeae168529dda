//! Takabot - Telegram bot for a referral-driven micro-payments workflow
//!
//! Users register with `/start` (optionally carrying a referrer id), pay a
//! flat activation fee verified manually by an admin via screenshot, earn a
//! fixed reward when users they referred get activated, and can file
//! withdraw/recharge requests against their balance.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, health endpoint
//! - `storage`: user registry persistence (SQLite)
//! - `ledger`: user state transitions and balance bookkeeping
//! - `telegram`: bot integration, dispatcher schema, handlers

pub mod cli;
pub mod core;
pub mod i18n;
pub mod ledger;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
