//! Chat entity operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use taleforge_domain::{Chat, ChatId, UserId};

use crate::infrastructure::ports::{ChatRepo, RepoError};

/// Chat entity operations.
pub struct Chats {
    repo: Arc<dyn ChatRepo>,
}

impl Chats {
    pub fn new(repo: Arc<dyn ChatRepo>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: ChatId) -> Result<Option<Chat>, RepoError> {
        self.repo.get(id).await
    }

    /// Fetch a chat only if `user_id` owns it.
    pub async fn get_owned(&self, id: ChatId, user_id: UserId) -> Result<Option<Chat>, RepoError> {
        Ok(self
            .repo
            .get(id)
            .await?
            .filter(|chat| chat.is_owned_by(user_id)))
    }

    pub async fn save(&self, chat: &Chat) -> Result<(), RepoError> {
        self.repo.save(chat).await
    }

    pub async fn delete(&self, id: ChatId) -> Result<(), RepoError> {
        self.repo.delete(id).await
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepoError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn update_title(
        &self,
        id: ChatId,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        self.repo.update_title(id, title, at).await
    }

    pub async fn touch(&self, id: ChatId, at: DateTime<Utc>) -> Result<(), RepoError> {
        self.repo.touch(id, at).await
    }
}
