//! HTTP request handlers.

mod chat;
mod health;

pub use chat::{chat_completions, method_not_allowed};
pub use health::{livez, readyz};
