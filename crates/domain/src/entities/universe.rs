//! Universe entities - Story settings supplying the narrator's system prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CustomUniverseId, UniverseId, UserId};

/// A shared story setting, seeded or curated globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Universe {
    pub id: UniverseId,
    pub name: String,
    pub description: String,
    /// The narrator's base instructions for this setting.
    pub system_prompt: String,
    /// Optional gameplay rules appended after the system prompt.
    pub game_instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Universe {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UniverseId::new(),
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            game_instructions: None,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_game_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.game_instructions = Some(instructions.into());
        self
    }
}

/// A user-authored story setting. Same prompt shape as [`Universe`], scoped
/// to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUniverse {
    pub id: CustomUniverseId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub game_instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomUniverse {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CustomUniverseId::new(),
            user_id,
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            game_instructions: None,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_game_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.game_instructions = Some(instructions.into());
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
