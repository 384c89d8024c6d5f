//! SQLite-backed character storage (curated and user-authored).

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use taleforge_domain::{
    Character, CharacterId, CustomCharacter, CustomCharacterId, UniverseId, UserId,
};

use super::helpers::{encode_abilities, parse_abilities, parse_datetime, parse_uuid};
use crate::infrastructure::ports::{CharacterRepo, CustomCharacterRepo, RepoError};

pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn character_from_row(row: &SqliteRow) -> Result<Character, RepoError> {
    let id: String = row.get("id");
    let universe_id: String = row.get("universe_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Character {
        id: CharacterId::from_uuid(parse_uuid(&id)?),
        universe_id: UniverseId::from_uuid(parse_uuid(&universe_id)?),
        name: row.get("name"),
        description: row.get("description"),
        is_protagonist: row.get("is_protagonist"),
        avatar_url: row.get("avatar_url"),
        personality: row.get("personality"),
        backstory: row.get("backstory"),
        special_abilities: parse_abilities(row.get("special_abilities"))?,
        is_active: row.get("is_active"),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("character.get", e))?;

        row.as_ref().map(character_from_row).transpose()
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO characters (
                id, universe_id, name, description, is_protagonist, avatar_url,
                personality, backstory, special_abilities, is_active,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                is_protagonist = excluded.is_protagonist,
                avatar_url = excluded.avatar_url,
                personality = excluded.personality,
                backstory = excluded.backstory,
                special_abilities = excluded.special_abilities,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.universe_id.to_string())
        .bind(&character.name)
        .bind(&character.description)
        .bind(character.is_protagonist)
        .bind(&character.avatar_url)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(encode_abilities(character.special_abilities.as_ref())?)
        .bind(character.is_active)
        .bind(character.created_at.to_rfc3339())
        .bind(character.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.save", e))?;

        Ok(())
    }

    async fn list_protagonists(&self) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM characters WHERE is_active = 1 AND is_protagonist = 1 \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.list_protagonists", e))?;

        rows.iter().map(character_from_row).collect()
    }

    async fn list_for_universe(
        &self,
        universe_id: UniverseId,
    ) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM characters WHERE universe_id = ? AND is_active = 1 \
             ORDER BY created_at DESC",
        )
        .bind(universe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.list_for_universe", e))?;

        rows.iter().map(character_from_row).collect()
    }

    async fn list_protagonists_for_universe(
        &self,
        universe_id: UniverseId,
    ) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM characters WHERE universe_id = ? AND is_active = 1 \
             AND is_protagonist = 1 ORDER BY created_at DESC",
        )
        .bind(universe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("character.list_protagonists_for_universe", e))?;

        rows.iter().map(character_from_row).collect()
    }
}

pub struct SqliteCustomCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCustomCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn custom_character_from_row(row: &SqliteRow) -> Result<CustomCharacter, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(CustomCharacter {
        id: CustomCharacterId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        name: row.get("name"),
        description: row.get("description"),
        personality: row.get("personality"),
        backstory: row.get("backstory"),
        special_abilities: parse_abilities(row.get("special_abilities"))?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl CustomCharacterRepo for SqliteCustomCharacterRepo {
    async fn get(&self, id: CustomCharacterId) -> Result<Option<CustomCharacter>, RepoError> {
        let row = sqlx::query("SELECT * FROM custom_characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("custom_character.get", e))?;

        row.as_ref().map(custom_character_from_row).transpose()
    }

    async fn save(&self, character: &CustomCharacter) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO custom_characters (
                id, user_id, name, description, personality, backstory,
                special_abilities, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                personality = excluded.personality,
                backstory = excluded.backstory,
                special_abilities = excluded.special_abilities,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.user_id.to_string())
        .bind(&character.name)
        .bind(&character.description)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(encode_abilities(character.special_abilities.as_ref())?)
        .bind(character.created_at.to_rfc3339())
        .bind(character.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("custom_character.save", e))?;

        Ok(())
    }

    async fn delete(&self, id: CustomCharacterId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM custom_characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("custom_character.delete", e))?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CustomCharacter>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM custom_characters WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("custom_character.list_for_user", e))?;

        rows.iter().map(custom_character_from_row).collect()
    }
}
