//! Chat lifecycle use cases: create, list, fetch, rename, delete.

use std::sync::Arc;

use taleforge_domain::{CharacterRef, Chat, ChatId, UniverseRef, UserId};
use thiserror::Error;

use crate::entities::{Chats, Messages};
use crate::infrastructure::ports::{ClockPort, RepoError};

/// Title given to a chat before the first exchange back-fills a real one.
pub const DEFAULT_CHAT_TITLE: &str = "New Adventure";
/// Model recorded on new chats when the caller does not pick one.
pub const DEFAULT_CHAT_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Error)]
pub enum ChatOpsError {
    #[error("Chat not found")]
    NotFound,
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

/// Parameters for creating a chat. All fields optional; defaults apply.
#[derive(Debug, Default, Clone)]
pub struct NewChat {
    pub title: Option<String>,
    pub model: Option<String>,
    pub universe: Option<UniverseRef>,
    pub character: Option<CharacterRef>,
}

pub struct ChatOps {
    chats: Arc<Chats>,
    messages: Arc<Messages>,
    clock: Arc<dyn ClockPort>,
}

impl ChatOps {
    pub fn new(chats: Arc<Chats>, messages: Arc<Messages>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            chats,
            messages,
            clock,
        }
    }

    pub async fn create(&self, user_id: UserId, params: NewChat) -> Result<Chat, ChatOpsError> {
        let now = self.clock.now();
        let title = params
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());
        let model = params.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let mut chat = Chat::new(user_id, title, now).with_model(model);
        if let Some(universe) = params.universe {
            chat = chat.with_universe(universe);
        }
        if let Some(character) = params.character {
            chat = chat.with_character(character);
        }

        self.chats.save(&chat).await?;
        Ok(chat)
    }

    /// Chats for a user, most recently updated first.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Chat>, ChatOpsError> {
        Ok(self.chats.list_for_user(user_id).await?)
    }

    pub async fn get(&self, user_id: UserId, chat_id: ChatId) -> Result<Chat, ChatOpsError> {
        self.chats
            .get_owned(chat_id, user_id)
            .await?
            .ok_or(ChatOpsError::NotFound)
    }

    pub async fn rename(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        title: &str,
    ) -> Result<Chat, ChatOpsError> {
        let mut chat = self.get(user_id, chat_id).await?;
        let now = self.clock.now();
        self.chats.update_title(chat_id, title.trim(), now).await?;
        chat.title = title.trim().to_string();
        chat.updated_at = now;
        Ok(chat)
    }

    /// Delete a chat and its messages. Messages go first so a failure
    /// between the two deletes never orphans them.
    pub async fn delete(&self, user_id: UserId, chat_id: ChatId) -> Result<(), ChatOpsError> {
        self.get(user_id, chat_id).await?;
        self.messages.delete_for_chat(chat_id).await?;
        self.chats.delete(chat_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockChatRepo, MockClockPort, MockMessageRepo};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        Arc::new(clock)
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let mut chat_repo = MockChatRepo::new();
        chat_repo
            .expect_save()
            .withf(|c| {
                c.title == DEFAULT_CHAT_TITLE && c.model.as_deref() == Some(DEFAULT_CHAT_MODEL)
            })
            .times(1)
            .returning(|_| Ok(()));

        let ops = ChatOps::new(
            Arc::new(Chats::new(Arc::new(chat_repo))),
            Arc::new(Messages::new(Arc::new(MockMessageRepo::new()))),
            clock(),
        );

        let chat = ops
            .create(UserId::new(), NewChat::default())
            .await
            .expect("create should succeed");
        assert_eq!(chat.title, DEFAULT_CHAT_TITLE);
        assert!(chat.universe.is_none());
    }

    #[tokio::test]
    async fn delete_removes_messages_before_the_chat() {
        let user_id = UserId::new();
        let chat = Chat::new(user_id, "Old tale", Utc::now());
        let chat_id = chat.id;

        let mut chat_repo = MockChatRepo::new();
        chat_repo
            .expect_get()
            .with(eq(chat_id))
            .returning(move |_| Ok(Some(chat.clone())));
        chat_repo
            .expect_delete()
            .with(eq(chat_id))
            .times(1)
            .returning(|_| Ok(()));

        let mut message_repo = MockMessageRepo::new();
        message_repo
            .expect_delete_for_chat()
            .with(eq(chat_id))
            .times(1)
            .returning(|_| Ok(()));

        let ops = ChatOps::new(
            Arc::new(Chats::new(Arc::new(chat_repo))),
            Arc::new(Messages::new(Arc::new(message_repo))),
            clock(),
        );

        ops.delete(user_id, chat_id)
            .await
            .expect("delete should succeed");
    }

    #[tokio::test]
    async fn delete_refuses_foreign_chats() {
        let owner = UserId::new();
        let chat = Chat::new(owner, "Private", Utc::now());
        let chat_id = chat.id;

        let mut chat_repo = MockChatRepo::new();
        chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        chat_repo.expect_delete().times(0);

        let mut message_repo = MockMessageRepo::new();
        message_repo.expect_delete_for_chat().times(0);

        let ops = ChatOps::new(
            Arc::new(Chats::new(Arc::new(chat_repo))),
            Arc::new(Messages::new(Arc::new(message_repo))),
            clock(),
        );

        let error = ops
            .delete(UserId::new(), chat_id)
            .await
            .expect_err("foreign delete must fail");
        assert!(matches!(error, ChatOpsError::NotFound));
    }
}
