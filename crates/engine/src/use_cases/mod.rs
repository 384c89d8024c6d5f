//! Application use cases, wired by the composition root.

pub mod chats;
pub mod characters;
pub mod conversation;
pub mod seed;
pub mod suggestions;
pub mod universes;

pub use chats::{ChatOps, ChatOpsError, NewChat, DEFAULT_CHAT_MODEL, DEFAULT_CHAT_TITLE};
pub use characters::{CharacterDraft, CharacterOps, CharacterOpsError, NewCharacter};
pub use conversation::{
    ContextAssembler, SendMessage, SendMessageError, SendOutcome, GENERATION_FAILURE_REPLY,
};
pub use seed::{SeedContent, SeedOutcome};
pub use suggestions::{
    FieldSuggestions, SuggestionContext, SuggestionError, SuggestionField, SuggestionTarget,
};
pub use universes::{UniverseDraft, UniverseOps, UniverseOpsError, UniverseUpdate};
