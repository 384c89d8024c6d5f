//! SQLite-backed message storage.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use taleforge_domain::{ChatId, Message, MessageId, MessageRole, UserId};

use super::helpers::{parse_datetime, parse_uuid};
use crate::infrastructure::ports::{MessageRepo, RepoError};

pub struct SqliteMessageRepo {
    pool: SqlitePool,
}

impl SqliteMessageRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message, RepoError> {
    let id: String = row.get("id");
    let chat_id: String = row.get("chat_id");
    let user_id: String = row.get("user_id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");

    Ok(Message {
        id: MessageId::from_uuid(parse_uuid(&id)?),
        chat_id: ChatId::from_uuid(parse_uuid(&chat_id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        role: MessageRole::parse(&role).map_err(RepoError::serialization)?,
        content: row.get("content"),
        model: row.get("model"),
        created_at: parse_datetime(&created_at)?,
    })
}

#[async_trait]
impl MessageRepo for SqliteMessageRepo {
    async fn save(&self, message: &Message) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, user_id, role, content, model, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.user_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&message.model)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("message.save", e))?;

        Ok(())
    }

    async fn list_for_chat(&self, chat_id: ChatId) -> Result<Vec<Message>, RepoError> {
        // rowid breaks ties between messages persisted in the same instant,
        // preserving insertion order exactly
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("message.list_for_chat", e))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn delete_for_chat(&self, chat_id: ChatId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("message.delete_for_chat", e))?;
        Ok(())
    }
}
