//! Telegram bot handler tree configuration
//!
//! The same schema is used in production and can be used in integration
//! tests with any dependencies.

mod schema;
mod types;

pub use schema::schema;
pub use types::{sender_from_user, HandlerDeps, HandlerError};
