//! Message entity - One immutable turn in a chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ChatId, MessageId, UserId};

/// Author role of a message, as replayed to the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(DomainError::Validation(format!(
                "unknown message role: {other}"
            ))),
        }
    }
}

/// A stored conversation turn.
///
/// Messages are immutable once created; the only bulk operation is
/// delete-by-chat when the owning chat is removed. `user_id` is always the
/// chat owner, even for assistant turns - it scopes authorization, not
/// authorship.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub role: MessageRole,
    pub content: String,
    /// Model identifier reported by the provider; absent for user turns and
    /// for assistant turns stored on the generation failure path.
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        chat_id: ChatId,
        user_id: UserId,
        role: MessageRole,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            chat_id,
            user_id,
            role,
            content: content.into(),
            model: None,
            created_at,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
