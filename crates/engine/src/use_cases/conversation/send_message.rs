//! SendMessage - the conversation turn pipeline.
//!
//! One call persists the user's message, replays the full history to the
//! generation backend under the chat's assembled system prompt, and persists
//! either the assistant's reply or a fixed failure reply. The user's message
//! is never lost: it is committed before generation is attempted.

use std::sync::Arc;

use dashmap::DashMap;
use taleforge_domain::{ChatId, Message, MessageRole, UserId};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::entities::{Chats, Messages};
use crate::infrastructure::ports::{ChatTurn, ClockPort, LlmPort, LlmRequest, RepoError};
use crate::use_cases::conversation::context::ContextAssembler;

/// Assistant reply stored when generation fails. The turn stays in history
/// with no model attribution.
pub const GENERATION_FAILURE_REPLY: &str =
    "I apologize, but I encountered an error while processing your request. Please try again.";

/// Outcome of a send. Generation failure is a domain outcome, not an error:
/// the turn completed and the failure reply is already in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Generation succeeded; `content` is the stored assistant reply.
    Reply { content: String },
    /// Generation failed; [`GENERATION_FAILURE_REPLY`] was stored instead.
    Failed { error: String },
    /// The input was empty after trimming. Nothing was stored or sent.
    Empty,
}

#[derive(Debug, Error)]
pub enum SendMessageError {
    /// The chat does not exist or belongs to another user. The two cases
    /// are indistinguishable to the caller.
    #[error("Chat not found")]
    ChatNotFound,
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

/// Use case for processing one conversation turn.
pub struct SendMessage {
    chats: Arc<Chats>,
    messages: Arc<Messages>,
    context: Arc<ContextAssembler>,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
    /// Per-chat send serialization. Concurrent sends to the same chat queue
    /// behind each other so history stays strictly ordered.
    send_locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl SendMessage {
    pub fn new(
        chats: Arc<Chats>,
        messages: Arc<Messages>,
        context: Arc<ContextAssembler>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            chats,
            messages,
            context,
            llm,
            clock,
            send_locks: DashMap::new(),
        }
    }

    /// Process one user message for a chat the user owns.
    pub async fn execute(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        content: &str,
    ) -> Result<SendOutcome, SendMessageError> {
        let lock = self.send_locks.entry(chat_id).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.process(user_id, chat_id, content).await
        };
        drop(lock);
        // Evict the lock once no sender holds a handle; a waiter queued on
        // the same chat keeps the strong count above one.
        self.send_locks
            .remove_if(&chat_id, |_, entry| Arc::strong_count(entry) == 1);
        result
    }

    async fn process(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        content: &str,
    ) -> Result<SendOutcome, SendMessageError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(SendOutcome::Empty);
        }

        let chat = self
            .chats
            .get_owned(chat_id, user_id)
            .await?
            .ok_or(SendMessageError::ChatNotFound)?;

        let now = self.clock.now();
        let user_message = Message::new(chat.id, user_id, MessageRole::User, content, now);
        self.messages.append(&user_message).await?;
        self.chats.touch(chat.id, now).await?;

        let history = self.messages.list_for_chat(chat.id).await?;
        let first_exchange = history.len() == 1;

        let system_prompt = self.context.build_system_prompt(&chat).await?;
        let turns = history
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        let mut request = LlmRequest::new(turns).with_model(chat.model.clone());
        if let Some(prompt) = system_prompt {
            request = request.with_system_prompt(prompt);
        }

        match self.llm.complete(request).await {
            Ok(response) => {
                let now = self.clock.now();
                let reply =
                    Message::new(chat.id, user_id, MessageRole::Assistant, &response.content, now)
                        .with_model(&response.model);
                self.messages.append(&reply).await?;
                self.chats.touch(chat.id, now).await?;

                if first_exchange {
                    self.backfill_title(chat.id, content).await;
                }

                Ok(SendOutcome::Reply {
                    content: response.content,
                })
            }
            Err(error) => {
                tracing::warn!(
                    chat_id = %chat.id,
                    error = %error,
                    "Generation failed; storing failure reply"
                );
                let now = self.clock.now();
                let reply = Message::new(
                    chat.id,
                    user_id,
                    MessageRole::Assistant,
                    GENERATION_FAILURE_REPLY,
                    now,
                );
                self.messages.append(&reply).await?;
                self.chats.touch(chat.id, now).await?;

                Ok(SendOutcome::Failed {
                    error: "Failed to get response".to_string(),
                })
            }
        }
    }

    /// Replace the default title after the first successful exchange.
    /// Best-effort: any failure keeps the current title.
    async fn backfill_title(&self, chat_id: ChatId, first_message: &str) {
        match self.llm.title_for(first_message).await {
            Ok(title) => {
                let now = self.clock.now();
                if let Err(error) = self.chats.update_title(chat_id, title.trim(), now).await {
                    tracing::warn!(
                        chat_id = %chat_id,
                        error = %error,
                        "Failed to store generated chat title"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(
                    chat_id = %chat_id,
                    error = %error,
                    "Title generation failed; keeping current title"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Characters, Universes};
    use crate::infrastructure::ports::{
        LlmError, LlmResponse, MockCharacterRepo, MockChatRepo, MockClockPort,
        MockCustomCharacterRepo, MockCustomUniverseRepo, MockLlmPort, MockMessageRepo,
        MockUniverseRepo,
    };
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use taleforge_domain::Chat;

    struct Fixture {
        chat_repo: MockChatRepo,
        message_repo: MockMessageRepo,
        universe_repo: MockUniverseRepo,
        character_repo: MockCharacterRepo,
        llm: MockLlmPort,
        clock: MockClockPort,
    }

    impl Fixture {
        fn new() -> Self {
            let mut clock = MockClockPort::new();
            clock
                .expect_now()
                .returning(|| Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
            Self {
                chat_repo: MockChatRepo::new(),
                message_repo: MockMessageRepo::new(),
                universe_repo: MockUniverseRepo::new(),
                character_repo: MockCharacterRepo::new(),
                llm: MockLlmPort::new(),
                clock,
            }
        }

        fn build(self) -> SendMessage {
            let chats = Arc::new(Chats::new(Arc::new(self.chat_repo)));
            let messages = Arc::new(Messages::new(Arc::new(self.message_repo)));
            let universes = Arc::new(Universes::new(
                Arc::new(self.universe_repo),
                Arc::new(MockCustomUniverseRepo::new()),
            ));
            let characters = Arc::new(Characters::new(
                Arc::new(self.character_repo),
                Arc::new(MockCustomCharacterRepo::new()),
            ));
            let context = Arc::new(ContextAssembler::new(universes, characters));
            SendMessage::new(
                chats,
                messages,
                context,
                Arc::new(self.llm),
                Arc::new(self.clock),
            )
        }
    }

    fn plain_chat(user_id: UserId) -> Chat {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        Chat::new(user_id, "New Adventure", now).with_model("openai/gpt-4o-mini")
    }

    fn reply(content: &str) -> LlmResponse {
        LlmResponse {
            content: content.to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            usage: None,
        }
    }

    #[tokio::test]
    async fn first_message_round_trip_persists_both_turns_and_backfills_title() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        {
            let chat = chat.clone();
            fx.chat_repo
                .expect_get()
                .with(eq(chat_id))
                .returning(move |_| Ok(Some(chat.clone())));
        }
        fx.chat_repo.expect_touch().times(2).returning(|_, _| Ok(()));
        fx.chat_repo
            .expect_update_title()
            .withf(move |id, title, _| *id == chat_id && title == "Space Greetings")
            .times(1)
            .returning(|_, _, _| Ok(()));

        fx.message_repo
            .expect_save()
            .withf(|m| m.role == MessageRole::User && m.content == "Hello" && m.model.is_none())
            .times(1)
            .returning(|_| Ok(()));
        fx.message_repo
            .expect_save()
            .withf(|m| {
                m.role == MessageRole::Assistant
                    && m.content == "Hi there!"
                    && m.model.as_deref() == Some("openai/gpt-4o-mini")
            })
            .times(1)
            .returning(|_| Ok(()));

        let user_turn = Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now());
        fx.message_repo
            .expect_list_for_chat()
            .with(eq(chat_id))
            .returning(move |_| Ok(vec![user_turn.clone()]));

        fx.llm
            .expect_complete()
            .withf(|req| {
                req.system_prompt.is_none()
                    && req.model.as_deref() == Some("openai/gpt-4o-mini")
                    && req.messages == vec![ChatTurn::user("Hello")]
            })
            .times(1)
            .returning(|_| Ok(reply("Hi there!")));
        fx.llm
            .expect_title_for()
            .with(eq("Hello"))
            .times(1)
            .returning(|_| Ok("Space Greetings".to_string()));

        let outcome = fx
            .build()
            .execute(user_id, chat_id, "Hello")
            .await
            .expect("send should succeed");
        assert_eq!(
            outcome,
            SendOutcome::Reply {
                content: "Hi there!".to_string()
            }
        );
    }

    #[tokio::test]
    async fn generation_failure_stores_apology_without_model() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.chat_repo.expect_touch().times(2).returning(|_, _| Ok(()));

        fx.message_repo
            .expect_save()
            .withf(|m| m.role == MessageRole::User)
            .times(1)
            .returning(|_| Ok(()));
        fx.message_repo
            .expect_save()
            .withf(|m| {
                m.role == MessageRole::Assistant
                    && m.content == GENERATION_FAILURE_REPLY
                    && m.model.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));

        let user_turn = Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now());
        fx.message_repo
            .expect_list_for_chat()
            .returning(move |_| Ok(vec![user_turn.clone()]));

        fx.llm
            .expect_complete()
            .times(1)
            .returning(|_| Err(LlmError::RequestFailed("connection reset".to_string())));
        // No title back-fill on a failed first exchange.
        fx.llm.expect_title_for().times(0);

        let outcome = fx
            .build()
            .execute(user_id, chat_id, "Hello")
            .await
            .expect("send should complete");
        assert!(matches!(outcome, SendOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn whitespace_only_input_is_a_no_op() {
        let user_id = UserId::new();
        let mut fx = Fixture::new();
        fx.chat_repo.expect_get().times(0);
        fx.message_repo.expect_save().times(0);
        fx.llm.expect_complete().times(0);

        let outcome = fx
            .build()
            .execute(user_id, ChatId::new(), "   \n\t  ")
            .await
            .expect("empty send should not fail");
        assert_eq!(outcome, SendOutcome::Empty);
    }

    #[tokio::test]
    async fn rejects_chats_owned_by_another_user_with_zero_writes() {
        let owner = UserId::new();
        let intruder = UserId::new();
        let chat = plain_chat(owner);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.message_repo.expect_save().times(0);
        fx.llm.expect_complete().times(0);

        let error = fx
            .build()
            .execute(intruder, chat_id, "Hello")
            .await
            .expect_err("foreign chat must be rejected");
        assert!(matches!(error, SendMessageError::ChatNotFound));
    }

    #[tokio::test]
    async fn title_backfill_skipped_after_first_exchange() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.chat_repo.expect_touch().times(2).returning(|_, _| Ok(()));
        fx.chat_repo.expect_update_title().times(0);

        fx.message_repo.expect_save().times(2).returning(|_| Ok(()));
        let history = vec![
            Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now()),
            Message::new(chat_id, user_id, MessageRole::Assistant, "Hi!", Utc::now()),
            Message::new(chat_id, user_id, MessageRole::User, "Tell me more", Utc::now()),
        ];
        fx.message_repo
            .expect_list_for_chat()
            .returning(move |_| Ok(history.clone()));

        // Full history is replayed in order on every send.
        fx.llm
            .expect_complete()
            .withf(|req| {
                req.messages.len() == 3
                    && req.messages[0] == ChatTurn::user("Hello")
                    && req.messages[1] == ChatTurn::assistant("Hi!")
                    && req.messages[2] == ChatTurn::user("Tell me more")
            })
            .times(1)
            .returning(|_| Ok(reply("Gladly.")));
        fx.llm.expect_title_for().times(0);

        let outcome = fx
            .build()
            .execute(user_id, chat_id, "Tell me more")
            .await
            .expect("send should succeed");
        assert!(matches!(outcome, SendOutcome::Reply { .. }));
    }

    #[tokio::test]
    async fn title_generation_failure_keeps_default_title() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.chat_repo.expect_touch().times(2).returning(|_, _| Ok(()));
        fx.chat_repo.expect_update_title().times(0);

        fx.message_repo.expect_save().times(2).returning(|_| Ok(()));
        let user_turn = Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now());
        fx.message_repo
            .expect_list_for_chat()
            .returning(move |_| Ok(vec![user_turn.clone()]));

        fx.llm.expect_complete().returning(|_| Ok(reply("Hi!")));
        fx.llm
            .expect_title_for()
            .times(1)
            .returning(|_| Err(LlmError::RequestFailed("timeout".to_string())));

        let outcome = fx
            .build()
            .execute(user_id, chat_id, "Hello")
            .await
            .expect("title failure must not fail the send");
        assert!(matches!(outcome, SendOutcome::Reply { .. }));
    }

    #[tokio::test]
    async fn send_lock_is_evicted_once_the_send_completes() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.chat_repo.expect_touch().returning(|_, _| Ok(()));
        fx.chat_repo
            .expect_update_title()
            .returning(|_, _, _| Ok(()));
        fx.message_repo.expect_save().returning(|_| Ok(()));
        let user_turn = Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now());
        fx.message_repo
            .expect_list_for_chat()
            .returning(move |_| Ok(vec![user_turn.clone()]));
        fx.llm.expect_complete().returning(|_| Ok(reply("Hi!")));
        fx.llm
            .expect_title_for()
            .returning(|_| Ok("Greetings".to_string()));

        let send = fx.build();
        send.execute(user_id, chat_id, "Hello")
            .await
            .expect("send should succeed");
        assert!(send.send_locks.is_empty());

        // A second send works the same after eviction.
        send.execute(user_id, chat_id, "Hello again")
            .await
            .expect("second send should succeed");
        assert!(send.send_locks.is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_persistence() {
        let user_id = UserId::new();
        let chat = plain_chat(user_id);
        let chat_id = chat.id;

        let mut fx = Fixture::new();
        fx.chat_repo
            .expect_get()
            .returning(move |_| Ok(Some(chat.clone())));
        fx.chat_repo.expect_touch().returning(|_, _| Ok(()));
        fx.chat_repo
            .expect_update_title()
            .returning(|_, _, _| Ok(()));

        fx.message_repo
            .expect_save()
            .withf(|m| m.role != MessageRole::User || m.content == "Hello")
            .times(2)
            .returning(|_| Ok(()));
        let user_turn = Message::new(chat_id, user_id, MessageRole::User, "Hello", Utc::now());
        fx.message_repo
            .expect_list_for_chat()
            .returning(move |_| Ok(vec![user_turn.clone()]));

        fx.llm.expect_complete().returning(|_| Ok(reply("Hi!")));
        fx.llm
            .expect_title_for()
            .with(eq("Hello"))
            .returning(|_| Ok("Greetings".to_string()));

        fx.build()
            .execute(user_id, chat_id, "  Hello  ")
            .await
            .expect("send should succeed");
    }
}
