//! Message entity operations.

use std::sync::Arc;

use taleforge_domain::{ChatId, Message};

use crate::infrastructure::ports::{MessageRepo, RepoError};

/// Message entity operations.
///
/// Messages are append-only; the only removal path is the cascade when a
/// chat is deleted.
pub struct Messages {
    repo: Arc<dyn MessageRepo>,
}

impl Messages {
    pub fn new(repo: Arc<dyn MessageRepo>) -> Self {
        Self { repo }
    }

    pub async fn append(&self, message: &Message) -> Result<(), RepoError> {
        self.repo.save(message).await
    }

    pub async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepoError> {
        self.repo.list_for_chat(chat_id).await
    }

    pub async fn delete_for_chat(&self, chat_id: ChatId) -> Result<(), RepoError> {
        self.repo.delete_for_chat(chat_id).await
    }
}
