//! Universe catalog use cases.
//!
//! Shared universes are read-only through the API; user-authored ones get
//! full owner-scoped CRUD.

use std::sync::Arc;

use taleforge_domain::{CustomUniverse, CustomUniverseId, Universe, UniverseId, UserId};
use thiserror::Error;

use crate::entities::Universes;
use crate::infrastructure::ports::{ClockPort, RepoError};

#[derive(Debug, Error)]
pub enum UniverseOpsError {
    #[error("Universe not found")]
    NotFound,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

/// Author-supplied fields for a user universe.
#[derive(Debug, Clone)]
pub struct UniverseDraft {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub game_instructions: Option<String>,
}

impl UniverseDraft {
    fn validate(&self) -> Result<(), UniverseOpsError> {
        if self.name.trim().is_empty() {
            return Err(UniverseOpsError::Invalid("name is required".to_string()));
        }
        if self.system_prompt.trim().is_empty() {
            return Err(UniverseOpsError::Invalid(
                "systemPrompt is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update for a shared universe. Unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UniverseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub game_instructions: Option<String>,
    pub is_active: Option<bool>,
}

pub struct UniverseOps {
    universes: Arc<Universes>,
    clock: Arc<dyn ClockPort>,
}

impl UniverseOps {
    pub fn new(universes: Arc<Universes>, clock: Arc<dyn ClockPort>) -> Self {
        Self { universes, clock }
    }

    pub async fn list_active(&self) -> Result<Vec<Universe>, UniverseOpsError> {
        Ok(self.universes.list_active().await?)
    }

    pub async fn get(&self, id: UniverseId) -> Result<Universe, UniverseOpsError> {
        self.universes
            .get(id)
            .await?
            .ok_or(UniverseOpsError::NotFound)
    }

    pub async fn create(&self, draft: UniverseDraft) -> Result<Universe, UniverseOpsError> {
        draft.validate()?;
        let now = self.clock.now();
        let mut universe = Universe::new(
            draft.name.trim(),
            draft.description,
            draft.system_prompt,
            now,
        );
        if let Some(instructions) = draft.game_instructions {
            universe = universe.with_game_instructions(instructions);
        }
        self.universes.save(&universe).await?;
        Ok(universe)
    }

    pub async fn update(
        &self,
        id: UniverseId,
        update: UniverseUpdate,
    ) -> Result<Universe, UniverseOpsError> {
        let mut universe = self.get(id).await?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(UniverseOpsError::Invalid("name is required".to_string()));
            }
            universe.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            universe.description = description;
        }
        if let Some(system_prompt) = update.system_prompt {
            if system_prompt.trim().is_empty() {
                return Err(UniverseOpsError::Invalid(
                    "systemPrompt is required".to_string(),
                ));
            }
            universe.system_prompt = system_prompt;
        }
        if let Some(instructions) = update.game_instructions {
            universe.game_instructions = Some(instructions);
        }
        if let Some(is_active) = update.is_active {
            universe.is_active = is_active;
        }
        universe.updated_at = self.clock.now();

        self.universes.save(&universe).await?;
        Ok(universe)
    }

    pub async fn create_custom(
        &self,
        user_id: UserId,
        draft: UniverseDraft,
    ) -> Result<CustomUniverse, UniverseOpsError> {
        draft.validate()?;
        let now = self.clock.now();
        let mut universe = CustomUniverse::new(
            user_id,
            draft.name.trim(),
            draft.description,
            draft.system_prompt,
            now,
        );
        if let Some(instructions) = draft.game_instructions {
            universe = universe.with_game_instructions(instructions);
        }
        self.universes.save_custom(&universe).await?;
        Ok(universe)
    }

    pub async fn update_custom(
        &self,
        user_id: UserId,
        id: CustomUniverseId,
        draft: UniverseDraft,
    ) -> Result<CustomUniverse, UniverseOpsError> {
        draft.validate()?;
        let mut universe = self
            .universes
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(UniverseOpsError::NotFound)?;

        universe.name = draft.name.trim().to_string();
        universe.description = draft.description;
        universe.system_prompt = draft.system_prompt;
        universe.game_instructions = draft.game_instructions;
        universe.updated_at = self.clock.now();

        self.universes.save_custom(&universe).await?;
        Ok(universe)
    }

    pub async fn delete_custom(
        &self,
        user_id: UserId,
        id: CustomUniverseId,
    ) -> Result<(), UniverseOpsError> {
        self.universes
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(UniverseOpsError::NotFound)?;
        Ok(self.universes.delete_custom(id).await?)
    }

    pub async fn get_custom(
        &self,
        user_id: UserId,
        id: CustomUniverseId,
    ) -> Result<CustomUniverse, UniverseOpsError> {
        self.universes
            .get_custom_owned(id, user_id)
            .await?
            .ok_or(UniverseOpsError::NotFound)
    }

    pub async fn list_custom(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomUniverse>, UniverseOpsError> {
        Ok(self.universes.list_custom_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockClockPort, MockCustomUniverseRepo, MockUniverseRepo,
    };
    use chrono::{TimeZone, Utc};

    fn ops(repo: MockUniverseRepo, custom: MockCustomUniverseRepo) -> UniverseOps {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        UniverseOps::new(
            Arc::new(Universes::new(Arc::new(repo), Arc::new(custom))),
            Arc::new(clock),
        )
    }

    fn draft() -> UniverseDraft {
        UniverseDraft {
            name: "Clockwork Seas".to_string(),
            description: "Brass and tide".to_string(),
            system_prompt: "You narrate a steampunk ocean world.".to_string(),
            game_instructions: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let mut bad = draft();
        bad.name = "   ".to_string();

        let mut custom = MockCustomUniverseRepo::new();
        custom.expect_save().times(0);

        let error = ops(MockUniverseRepo::new(), custom)
            .create_custom(UserId::new(), bad)
            .await
            .expect_err("blank name must be rejected");
        assert!(matches!(error, UniverseOpsError::Invalid(_)));
    }

    #[tokio::test]
    async fn create_stores_a_shared_universe() {
        let mut repo = MockUniverseRepo::new();
        repo.expect_save()
            .withf(|u| u.name == "Clockwork Seas" && u.is_active && u.game_instructions.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let universe = ops(repo, MockCustomUniverseRepo::new())
            .create(draft())
            .await
            .expect("create should succeed");
        assert_eq!(universe.name, "Clockwork Seas");
    }

    #[tokio::test]
    async fn update_is_partial_and_can_deactivate() {
        let now = Utc::now();
        let existing = Universe::new("Clockwork Seas", "Brass and tide", "Prompt v1", now);
        let id = existing.id;

        let mut repo = MockUniverseRepo::new();
        {
            let existing = existing.clone();
            repo.expect_get()
                .returning(move |_| Ok(Some(existing.clone())));
        }
        repo.expect_save()
            .withf(|u| {
                u.description == "Iron and storm"
                    && u.system_prompt == "Prompt v1"
                    && u.name == "Clockwork Seas"
                    && !u.is_active
            })
            .times(1)
            .returning(|_| Ok(()));

        let updated = ops(repo, MockCustomUniverseRepo::new())
            .update(
                id,
                UniverseUpdate {
                    description: Some("Iron and storm".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("update should succeed");
        assert!(!updated.is_active);
        assert_eq!(updated.system_prompt, "Prompt v1");
    }

    #[tokio::test]
    async fn update_rejects_blank_name() {
        let now = Utc::now();
        let existing = Universe::new("Clockwork Seas", "Brass", "Prompt", now);
        let id = existing.id;

        let mut repo = MockUniverseRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_save().times(0);

        let error = ops(repo, MockCustomUniverseRepo::new())
            .update(
                id,
                UniverseUpdate {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("blank name must be rejected");
        assert!(matches!(error, UniverseOpsError::Invalid(_)));
    }

    #[tokio::test]
    async fn update_refuses_foreign_universe() {
        let owner = UserId::new();
        let universe = CustomUniverse::new(owner, "Mine", "d", "p", Utc::now());
        let id = universe.id;

        let mut custom = MockCustomUniverseRepo::new();
        custom
            .expect_get()
            .returning(move |_| Ok(Some(universe.clone())));
        custom.expect_save().times(0);

        let error = ops(MockUniverseRepo::new(), custom)
            .update_custom(UserId::new(), id, draft())
            .await
            .expect_err("foreign update must fail");
        assert!(matches!(error, UniverseOpsError::NotFound));
    }
}
