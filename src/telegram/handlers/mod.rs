//! Dispatcher schema, handler dependencies, and command handlers

pub mod commands;
pub mod schema;
pub mod types;

// Re-exports for convenience
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
