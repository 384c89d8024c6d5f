//! Universe entity operations (shared and user-authored).

use std::sync::Arc;

use taleforge_domain::{CustomUniverse, CustomUniverseId, Universe, UniverseId, UserId};

use crate::infrastructure::ports::{CustomUniverseRepo, RepoError, UniverseRepo};

/// Universe entity operations over both storage variants.
pub struct Universes {
    repo: Arc<dyn UniverseRepo>,
    custom_repo: Arc<dyn CustomUniverseRepo>,
}

impl Universes {
    pub fn new(repo: Arc<dyn UniverseRepo>, custom_repo: Arc<dyn CustomUniverseRepo>) -> Self {
        Self { repo, custom_repo }
    }

    pub async fn get(&self, id: UniverseId) -> Result<Option<Universe>, RepoError> {
        self.repo.get(id).await
    }

    pub async fn save(&self, universe: &Universe) -> Result<(), RepoError> {
        self.repo.save(universe).await
    }

    pub async fn list_active(&self) -> Result<Vec<Universe>, RepoError> {
        self.repo.list_active().await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Universe>, RepoError> {
        self.repo.find_by_name(name).await
    }

    pub async fn get_custom(
        &self,
        id: CustomUniverseId,
    ) -> Result<Option<CustomUniverse>, RepoError> {
        self.custom_repo.get(id).await
    }

    /// Fetch a custom universe only if `user_id` owns it.
    pub async fn get_custom_owned(
        &self,
        id: CustomUniverseId,
        user_id: UserId,
    ) -> Result<Option<CustomUniverse>, RepoError> {
        Ok(self
            .custom_repo
            .get(id)
            .await?
            .filter(|universe| universe.is_owned_by(user_id)))
    }

    pub async fn save_custom(&self, universe: &CustomUniverse) -> Result<(), RepoError> {
        self.custom_repo.save(universe).await
    }

    pub async fn delete_custom(&self, id: CustomUniverseId) -> Result<(), RepoError> {
        self.custom_repo.delete(id).await
    }

    pub async fn list_custom_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomUniverse>, RepoError> {
        self.custom_repo.list_for_user(user_id).await
    }
}
