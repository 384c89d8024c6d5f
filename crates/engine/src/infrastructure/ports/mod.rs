//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is
//! concrete types. Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - LLM calls (could swap OpenRouter -> Ollama/Claude)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{LlmError, RepoError};
pub use external::{ChatTurn, LlmPort, LlmRequest, LlmResponse, TokenUsage};
pub use repos::{
    CharacterRepo, ChatRepo, CustomCharacterRepo, CustomUniverseRepo, MessageRepo, UniverseRepo,
};
pub use testing::ClockPort;

#[cfg(test)]
pub use external::MockLlmPort;
#[cfg(test)]
pub use repos::{
    MockCharacterRepo, MockChatRepo, MockCustomCharacterRepo, MockCustomUniverseRepo,
    MockMessageRepo, MockUniverseRepo,
};
#[cfg(test)]
pub use testing::MockClockPort;
