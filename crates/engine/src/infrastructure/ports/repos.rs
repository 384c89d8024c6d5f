//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taleforge_domain::*;

use super::error::RepoError;

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepo: Send + Sync {
    async fn get(&self, id: ChatId) -> Result<Option<Chat>, RepoError>;
    async fn save(&self, chat: &Chat) -> Result<(), RepoError>;
    async fn delete(&self, id: ChatId) -> Result<(), RepoError>;

    /// Chats owned by a user, most recently updated first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepoError>;

    /// Rename a chat and advance its `updated_at`.
    async fn update_title(
        &self,
        id: ChatId,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Advance `updated_at` only. Called whenever a message is appended.
    async fn touch(&self, id: ChatId, at: DateTime<Utc>) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn save(&self, message: &Message) -> Result<(), RepoError>;

    /// Full ordered history for a chat, ascending by creation order.
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepoError>;

    /// Bulk delete when the owning chat is removed.
    async fn delete_for_chat(&self, chat_id: ChatId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseRepo: Send + Sync {
    async fn get(&self, id: UniverseId) -> Result<Option<Universe>, RepoError>;
    async fn save(&self, universe: &Universe) -> Result<(), RepoError>;

    /// Active shared universes, newest first.
    async fn list_active(&self) -> Result<Vec<Universe>, RepoError>;

    /// Lookup by exact name. Used for idempotent seeding.
    async fn find_by_name(&self, name: &str) -> Result<Option<Universe>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomUniverseRepo: Send + Sync {
    async fn get(&self, id: CustomUniverseId) -> Result<Option<CustomUniverse>, RepoError>;
    async fn save(&self, universe: &CustomUniverse) -> Result<(), RepoError>;
    async fn delete(&self, id: CustomUniverseId) -> Result<(), RepoError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CustomUniverse>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;

    /// Active protagonists across all universes.
    async fn list_protagonists(&self) -> Result<Vec<Character>, RepoError>;

    /// Active characters in one universe.
    async fn list_for_universe(&self, universe_id: UniverseId) -> Result<Vec<Character>, RepoError>;

    /// Active protagonists in one universe.
    async fn list_protagonists_for_universe(
        &self,
        universe_id: UniverseId,
    ) -> Result<Vec<Character>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomCharacterRepo: Send + Sync {
    async fn get(&self, id: CustomCharacterId) -> Result<Option<CustomCharacter>, RepoError>;
    async fn save(&self, character: &CustomCharacter) -> Result<(), RepoError>;
    async fn delete(&self, id: CustomCharacterId) -> Result<(), RepoError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CustomCharacter>, RepoError>;
}
