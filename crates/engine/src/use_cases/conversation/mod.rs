//! Conversation orchestration use cases.

pub mod context;
pub mod send_message;

pub use context::ContextAssembler;
pub use send_message::{SendMessage, SendMessageError, SendOutcome, GENERATION_FAILURE_REPLY};
