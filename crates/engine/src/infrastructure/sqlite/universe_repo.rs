//! SQLite-backed universe storage (shared and user-authored).

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use taleforge_domain::{CustomUniverse, CustomUniverseId, Universe, UniverseId, UserId};

use super::helpers::{parse_datetime, parse_uuid};
use crate::infrastructure::ports::{CustomUniverseRepo, RepoError, UniverseRepo};

pub struct SqliteUniverseRepo {
    pool: SqlitePool,
}

impl SqliteUniverseRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn universe_from_row(row: &SqliteRow) -> Result<Universe, RepoError> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Universe {
        id: UniverseId::from_uuid(parse_uuid(&id)?),
        name: row.get("name"),
        description: row.get("description"),
        system_prompt: row.get("system_prompt"),
        game_instructions: row.get("game_instructions"),
        is_active: row.get("is_active"),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl UniverseRepo for SqliteUniverseRepo {
    async fn get(&self, id: UniverseId) -> Result<Option<Universe>, RepoError> {
        let row = sqlx::query("SELECT * FROM universes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("universe.get", e))?;

        row.as_ref().map(universe_from_row).transpose()
    }

    async fn save(&self, universe: &Universe) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO universes (
                id, name, description, system_prompt, game_instructions,
                is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                system_prompt = excluded.system_prompt,
                game_instructions = excluded.game_instructions,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(universe.id.to_string())
        .bind(&universe.name)
        .bind(&universe.description)
        .bind(&universe.system_prompt)
        .bind(&universe.game_instructions)
        .bind(universe.is_active)
        .bind(universe.created_at.to_rfc3339())
        .bind(universe.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("universe.save", e))?;

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Universe>, RepoError> {
        let rows =
            sqlx::query("SELECT * FROM universes WHERE is_active = 1 ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::database("universe.list_active", e))?;

        rows.iter().map(universe_from_row).collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Universe>, RepoError> {
        let row = sqlx::query("SELECT * FROM universes WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("universe.find_by_name", e))?;

        row.as_ref().map(universe_from_row).transpose()
    }
}

pub struct SqliteCustomUniverseRepo {
    pool: SqlitePool,
}

impl SqliteCustomUniverseRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn custom_universe_from_row(row: &SqliteRow) -> Result<CustomUniverse, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(CustomUniverse {
        id: CustomUniverseId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        name: row.get("name"),
        description: row.get("description"),
        system_prompt: row.get("system_prompt"),
        game_instructions: row.get("game_instructions"),
        is_active: row.get("is_active"),
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

#[async_trait]
impl CustomUniverseRepo for SqliteCustomUniverseRepo {
    async fn get(&self, id: CustomUniverseId) -> Result<Option<CustomUniverse>, RepoError> {
        let row = sqlx::query("SELECT * FROM custom_universes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("custom_universe.get", e))?;

        row.as_ref().map(custom_universe_from_row).transpose()
    }

    async fn save(&self, universe: &CustomUniverse) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO custom_universes (
                id, user_id, name, description, system_prompt, game_instructions,
                is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                system_prompt = excluded.system_prompt,
                game_instructions = excluded.game_instructions,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(universe.id.to_string())
        .bind(universe.user_id.to_string())
        .bind(&universe.name)
        .bind(&universe.description)
        .bind(&universe.system_prompt)
        .bind(&universe.game_instructions)
        .bind(universe.is_active)
        .bind(universe.created_at.to_rfc3339())
        .bind(universe.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("custom_universe.save", e))?;

        Ok(())
    }

    async fn delete(&self, id: CustomUniverseId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM custom_universes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("custom_universe.delete", e))?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CustomUniverse>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM custom_universes WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("custom_universe.list_for_user", e))?;

        rows.iter().map(custom_universe_from_row).collect()
    }
}
