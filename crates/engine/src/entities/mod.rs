//! Entity modules - Domain capability encapsulation.
//!
//! Each module wraps operations for a persisted entity type. They depend
//! on repository ports and provide the building blocks for use cases.

pub mod character;
pub mod chat;
pub mod message;
pub mod universe;

pub use character::Characters;
pub use chat::Chats;
pub use message::Messages;
pub use universe::Universes;
