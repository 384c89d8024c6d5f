//! TaleForge domain types.
//!
//! Pure data: typed ids, entity structs, and the tagged reference types that
//! bind a chat to its story setting. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;

pub use entities::{
    Character, CharacterRef, Chat, CustomCharacter, CustomUniverse, Message, MessageRole, Universe,
    UniverseRef,
};
pub use error::DomainError;
pub use ids::{
    CharacterId, ChatId, CustomCharacterId, CustomUniverseId, MessageId, UniverseId, UserId,
};
