//! Character roster use cases.
//!
//! Shared characters are read-only through the API; user-authored ones get
//! full owner-scoped CRUD.

use std::sync::Arc;

use taleforge_domain::{
    Character, CharacterId, CustomCharacter, CustomCharacterId, UniverseId, UserId,
};
use thiserror::Error;

use crate::entities::Characters;
use crate::infrastructure::ports::{ClockPort, RepoError};

#[derive(Debug, Error)]
pub enum CharacterOpsError {
    #[error("Character not found")]
    NotFound,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

/// Author-supplied fields for a user character.
#[derive(Debug, Clone)]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub special_abilities: Option<Vec<String>>,
}

impl CharacterDraft {
    fn validate(&self) -> Result<(), CharacterOpsError> {
        if self.name.trim().is_empty() {
            return Err(CharacterOpsError::Invalid("name is required".to_string()));
        }
        Ok(())
    }
}

/// Fields for a new shared character, scoped to a universe.
#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub universe_id: UniverseId,
    pub name: String,
    pub description: String,
    pub is_protagonist: bool,
    pub avatar_url: Option<String>,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub special_abilities: Option<Vec<String>>,
}

pub struct CharacterOps {
    characters: Arc<Characters>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterOps {
    pub fn new(characters: Arc<Characters>, clock: Arc<dyn ClockPort>) -> Self {
        Self { characters, clock }
    }

    pub async fn create(&self, params: NewCharacter) -> Result<Character, CharacterOpsError> {
        if params.name.trim().is_empty() {
            return Err(CharacterOpsError::Invalid("name is required".to_string()));
        }
        let now = self.clock.now();
        let mut character = Character::new(
            params.universe_id,
            params.name.trim(),
            params.description,
            now,
        );
        if params.is_protagonist {
            character = character.protagonist();
        }
        if let Some(url) = params.avatar_url {
            character = character.with_avatar_url(url);
        }
        if let Some(personality) = params.personality {
            character = character.with_personality(personality);
        }
        if let Some(backstory) = params.backstory {
            character = character.with_backstory(backstory);
        }
        if let Some(abilities) = params.special_abilities {
            character = character.with_special_abilities(abilities);
        }
        self.characters.save(&character).await?;
        Ok(character)
    }

    pub async fn get(&self, id: CharacterId) -> Result<Character, CharacterOpsError> {
        self.characters
            .get(id)
            .await?
            .ok_or(CharacterOpsError::NotFound)
    }

    pub async fn list_protagonists(&self) -> Result<Vec<Character>, CharacterOpsError> {
        Ok(self.characters.list_protagonists().await?)
    }

    pub async fn list_for_universe(
        &self,
        universe_id: UniverseId,
        protagonists_only: bool,
    ) -> Result<Vec<Character>, CharacterOpsError> {
        if protagonists_only {
            Ok(self
                .characters
                .list_protagonists_for_universe(universe_id)
                .await?)
        } else {
            Ok(self.characters.list_for_universe(universe_id).await?)
        }
    }

    pub async fn create_custom(
        &self,
        user_id: UserId,
        draft: CharacterDraft,
    ) -> Result<CustomCharacter, CharacterOpsError> {
        draft.validate()?;
        let now = self.clock.now();
        let mut character =
            CustomCharacter::new(user_id, draft.name.trim(), draft.description, now);
        if let Some(personality) = draft.personality {
            character = character.with_personality(personality);
        }
        if let Some(backstory) = draft.backstory {
            character = character.with_backstory(backstory);
        }
        if let Some(abilities) = draft.special_abilities {
            character = character.with_special_abilities(abilities);
        }
        self.characters.save_custom(&character).await?;
        Ok(character)
    }

    pub async fn update_custom(
        &self,
        user_id: UserId,
        id: CustomCharacterId,
        draft: CharacterDraft,
    ) -> Result<CustomCharacter, CharacterOpsError> {
        draft.validate()?;
        let mut character = self
            .characters
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(CharacterOpsError::NotFound)?;

        character.name = draft.name.trim().to_string();
        character.description = draft.description;
        character.personality = draft.personality;
        character.backstory = draft.backstory;
        character.special_abilities = draft.special_abilities;
        character.updated_at = self.clock.now();

        self.characters.save_custom(&character).await?;
        Ok(character)
    }

    pub async fn delete_custom(
        &self,
        user_id: UserId,
        id: CustomCharacterId,
    ) -> Result<(), CharacterOpsError> {
        self.characters
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(CharacterOpsError::NotFound)?;
        Ok(self.characters.delete_custom(id).await?)
    }

    pub async fn get_custom(
        &self,
        user_id: UserId,
        id: CustomCharacterId,
    ) -> Result<CustomCharacter, CharacterOpsError> {
        self.characters
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(CharacterOpsError::NotFound)
    }

    pub async fn list_custom(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomCharacter>, CharacterOpsError> {
        Ok(self.characters.list_custom_for_user(user_id).await?)
    }
}
