//! Application state and composition.

use std::sync::Arc;

use crate::entities::{Characters, Chats, Messages, Universes};
use crate::infrastructure::{
    clock::SystemClock,
    ports::{ClockPort, LlmPort},
    sqlite::SqliteRepositories,
};
use crate::use_cases::{
    CharacterOps, ChatOps, ContextAssembler, FieldSuggestions, SeedContent, SendMessage,
    UniverseOps,
};

/// Main application state.
///
/// Holds entity modules and use cases. Passed to HTTP handlers via Axum
/// state.
pub struct App {
    pub entities: Entities,
    pub use_cases: UseCases,
    pub llm: Arc<dyn LlmPort>,
}

/// Container for entity modules.
pub struct Entities {
    pub chats: Arc<Chats>,
    pub messages: Arc<Messages>,
    pub universes: Arc<Universes>,
    pub characters: Arc<Characters>,
}

/// Container for use cases.
pub struct UseCases {
    pub send_message: Arc<SendMessage>,
    pub chat_ops: Arc<ChatOps>,
    pub universe_ops: Arc<UniverseOps>,
    pub character_ops: Arc<CharacterOps>,
    pub suggestions: Arc<FieldSuggestions>,
    pub seed: Arc<SeedContent>,
}

impl App {
    /// Wire all dependencies.
    pub fn new(repos: SqliteRepositories, llm: Arc<dyn LlmPort>) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

        let chats = Arc::new(Chats::new(repos.chat.clone()));
        let messages = Arc::new(Messages::new(repos.message.clone()));
        let universes = Arc::new(Universes::new(
            repos.universe.clone(),
            repos.custom_universe.clone(),
        ));
        let characters = Arc::new(Characters::new(
            repos.character.clone(),
            repos.custom_character.clone(),
        ));

        let context = Arc::new(ContextAssembler::new(universes.clone(), characters.clone()));
        let send_message = Arc::new(SendMessage::new(
            chats.clone(),
            messages.clone(),
            context,
            llm.clone(),
            clock.clone(),
        ));
        let chat_ops = Arc::new(ChatOps::new(chats.clone(), messages.clone(), clock.clone()));
        let universe_ops = Arc::new(UniverseOps::new(universes.clone(), clock.clone()));
        let character_ops = Arc::new(CharacterOps::new(characters.clone(), clock.clone()));
        let suggestions = Arc::new(FieldSuggestions::new(llm.clone()));
        let seed = Arc::new(SeedContent::new(
            universes.clone(),
            characters.clone(),
            clock,
        ));

        Self {
            entities: Entities {
                chats,
                messages,
                universes,
                characters,
            },
            use_cases: UseCases {
                send_message,
                chat_ops,
                universe_ops,
                character_ops,
                suggestions,
                seed,
            },
            llm,
        }
    }
}
