//! SQLite-backed chat storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use taleforge_domain::{CharacterRef, Chat, ChatId, UniverseRef, UserId};

use super::helpers::{parse_datetime, parse_uuid};
use crate::infrastructure::ports::{ChatRepo, RepoError};

pub struct SqliteChatRepo {
    pool: SqlitePool,
}

impl SqliteChatRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn universe_ref_from_row(row: &SqliteRow) -> Result<Option<UniverseRef>, RepoError> {
    let kind: Option<String> = row.get("universe_kind");
    let id: Option<String> = row.get("universe_id");
    match (kind, id) {
        (Some(kind), Some(id)) => {
            let reference = UniverseRef::from_parts(&kind, parse_uuid(&id)?)
                .map_err(RepoError::serialization)?;
            Ok(Some(reference))
        }
        (None, None) => Ok(None),
        _ => Err(RepoError::serialization(
            "universe_kind and universe_id must be set together",
        )),
    }
}

fn character_ref_from_row(row: &SqliteRow) -> Result<Option<CharacterRef>, RepoError> {
    let kind: Option<String> = row.get("character_kind");
    let id: Option<String> = row.get("character_id");
    match (kind, id) {
        (Some(kind), Some(id)) => {
            let reference = CharacterRef::from_parts(&kind, parse_uuid(&id)?)
                .map_err(RepoError::serialization)?;
            Ok(Some(reference))
        }
        (None, None) => Ok(None),
        _ => Err(RepoError::serialization(
            "character_kind and character_id must be set together",
        )),
    }
}

fn chat_from_row(row: &SqliteRow) -> Result<Chat, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Chat {
        id: ChatId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        title: row.get("title"),
        model: row.get("model"),
        universe: universe_ref_from_row(row)?,
        character: character_ref_from_row(row)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl ChatRepo for SqliteChatRepo {
    async fn get(&self, id: ChatId) -> Result<Option<Chat>, RepoError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("chat.get", e))?;

        row.as_ref().map(chat_from_row).transpose()
    }

    async fn save(&self, chat: &Chat) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO chats (
                id, user_id, title, model,
                universe_kind, universe_id, character_kind, character_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                model = excluded.model,
                universe_kind = excluded.universe_kind,
                universe_id = excluded.universe_id,
                character_kind = excluded.character_kind,
                character_id = excluded.character_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chat.id.to_string())
        .bind(chat.user_id.to_string())
        .bind(&chat.title)
        .bind(&chat.model)
        .bind(chat.universe.as_ref().map(|r| r.kind()))
        .bind(chat.universe.as_ref().map(|r| r.id().to_string()))
        .bind(chat.character.as_ref().map(|r| r.kind()))
        .bind(chat.character.as_ref().map(|r| r.id().to_string()))
        .bind(chat.created_at.to_rfc3339())
        .bind(chat.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("chat.save", e))?;

        Ok(())
    }

    async fn delete(&self, id: ChatId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("chat.delete", e))?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Chat>, RepoError> {
        let rows = sqlx::query("SELECT * FROM chats WHERE user_id = ? ORDER BY updated_at DESC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("chat.list_for_user", e))?;

        rows.iter().map(chat_from_row).collect()
    }

    async fn update_title(
        &self,
        id: ChatId,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE chats SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("chat.update_title", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Chat", id));
        }
        Ok(())
    }

    async fn touch(&self, id: ChatId, at: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("chat.touch", e))?;
        Ok(())
    }
}
