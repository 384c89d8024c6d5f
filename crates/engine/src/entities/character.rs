//! Character entity operations (curated and user-authored).

use std::sync::Arc;

use taleforge_domain::{
    Character, CharacterId, CustomCharacter, CustomCharacterId, UniverseId, UserId,
};

use crate::infrastructure::ports::{CharacterRepo, CustomCharacterRepo, RepoError};

/// Character entity operations over both storage variants.
pub struct Characters {
    repo: Arc<dyn CharacterRepo>,
    custom_repo: Arc<dyn CustomCharacterRepo>,
}

impl Characters {
    pub fn new(repo: Arc<dyn CharacterRepo>, custom_repo: Arc<dyn CustomCharacterRepo>) -> Self {
        Self { repo, custom_repo }
    }

    pub async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        self.repo.get(id).await
    }

    pub async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.repo.save(character).await
    }

    pub async fn list_protagonists(&self) -> Result<Vec<Character>, RepoError> {
        self.repo.list_protagonists().await
    }

    pub async fn list_for_universe(
        &self,
        universe_id: UniverseId,
    ) -> Result<Vec<Character>, RepoError> {
        self.repo.list_for_universe(universe_id).await
    }

    pub async fn list_protagonists_for_universe(
        &self,
        universe_id: UniverseId,
    ) -> Result<Vec<Character>, RepoError> {
        self.repo.list_protagonists_for_universe(universe_id).await
    }

    pub async fn get_custom(
        &self,
        id: CustomCharacterId,
    ) -> Result<Option<CustomCharacter>, RepoError> {
        self.custom_repo.get(id).await
    }

    /// Fetch a custom character only if `user_id` owns it.
    pub async fn get_custom_owned(
        &self,
        id: CustomCharacterId,
        user_id: UserId,
    ) -> Result<Option<CustomCharacter>, RepoError> {
        Ok(self
            .custom_repo
            .get(id)
            .await?
            .filter(|character| character.is_owned_by(user_id)))
    }

    pub async fn save_custom(&self, character: &CustomCharacter) -> Result<(), RepoError> {
        self.custom_repo.save(character).await
    }

    pub async fn delete_custom(&self, id: CustomCharacterId) -> Result<(), RepoError> {
        self.custom_repo.delete(id).await
    }

    pub async fn list_custom_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomCharacter>, RepoError> {
        self.custom_repo.list_for_user(user_id).await
    }
}
