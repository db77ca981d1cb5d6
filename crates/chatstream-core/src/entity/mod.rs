//! Conversation entities
//!
//! - [`Model`]: completion model descriptor with its context window
//! - [`Message`]: immutable turn record with a precomputed token count
//! - [`Conversation`]: the token-window state machine

mod conversation;
mod message;
mod model;

pub use conversation::{ChatConfig, Conversation, Status};
pub use message::{Message, Role};
pub use model::Model;
