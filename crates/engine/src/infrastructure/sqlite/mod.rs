//! SQLite database implementations.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::infrastructure::ports::RepoError;

mod helpers;

mod character_repo;
mod chat_repo;
mod message_repo;
mod universe_repo;

pub use character_repo::{SqliteCharacterRepo, SqliteCustomCharacterRepo};
pub use chat_repo::SqliteChatRepo;
pub use message_repo::SqliteMessageRepo;
pub use universe_repo::{SqliteCustomUniverseRepo, SqliteUniverseRepo};

/// All SQLite repositories sharing one connection pool.
pub struct SqliteRepositories {
    pub chat: Arc<SqliteChatRepo>,
    pub message: Arc<SqliteMessageRepo>,
    pub universe: Arc<SqliteUniverseRepo>,
    pub custom_universe: Arc<SqliteCustomUniverseRepo>,
    pub character: Arc<SqliteCharacterRepo>,
    pub custom_character: Arc<SqliteCustomCharacterRepo>,
}

impl SqliteRepositories {
    /// Connect to (creating if needed) the database file and bootstrap the
    /// schema.
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        ensure_schema(&pool).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            chat: Arc::new(SqliteChatRepo::new(pool.clone())),
            message: Arc::new(SqliteMessageRepo::new(pool.clone())),
            universe: Arc::new(SqliteUniverseRepo::new(pool.clone())),
            custom_universe: Arc::new(SqliteCustomUniverseRepo::new(pool.clone())),
            character: Arc::new(SqliteCharacterRepo::new(pool.clone())),
            custom_character: Arc::new(SqliteCustomCharacterRepo::new(pool)),
        }
    }
}

/// Create tables and indexes if they do not exist.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS chats (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            model TEXT,
            universe_kind TEXT,
            universe_id TEXT,
            character_kind TEXT,
            character_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_chats_user ON chats(user_id, updated_at)",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            chat_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            model TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages(chat_id, created_at)",
        r#"
        CREATE TABLE IF NOT EXISTS universes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            system_prompt TEXT NOT NULL,
            game_instructions TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_universes_active ON universes(is_active)",
        r#"
        CREATE TABLE IF NOT EXISTS custom_universes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            system_prompt TEXT NOT NULL,
            game_instructions TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_custom_universes_user ON custom_universes(user_id)",
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id TEXT PRIMARY KEY,
            universe_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            is_protagonist INTEGER NOT NULL DEFAULT 0,
            avatar_url TEXT,
            personality TEXT,
            backstory TEXT,
            special_abilities TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_characters_universe \
         ON characters(universe_id, is_protagonist)",
        r#"
        CREATE TABLE IF NOT EXISTS custom_characters (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            personality TEXT,
            backstory TEXT,
            special_abilities TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_custom_characters_user ON custom_characters(user_id)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }

    Ok(())
}
