//! Entity modules.
//!
//! Serde-serializable structs mirroring the persisted tables, plus the
//! tagged reference types that bind a chat to its story setting.

pub mod character;
pub mod chat;
pub mod message;
pub mod universe;

pub use character::{Character, CustomCharacter};
pub use chat::{CharacterRef, Chat, UniverseRef};
pub use message::{Message, MessageRole};
pub use universe::{CustomUniverse, Universe};
