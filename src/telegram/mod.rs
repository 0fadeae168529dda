//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod menu;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use menu::{join_group_keyboard, main_menu_keyboard};
