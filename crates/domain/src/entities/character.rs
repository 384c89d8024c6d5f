//! Character entities - Personas the user embodies in a chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, CustomCharacterId, UniverseId, UserId};

/// A curated character belonging to a shared universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub universe_id: UniverseId,
    pub name: String,
    pub description: String,
    /// Protagonists are the personas offered when starting an adventure.
    pub is_protagonist: bool,
    pub avatar_url: Option<String>,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub special_abilities: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(
        universe_id: UniverseId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            universe_id,
            name: name.into(),
            description: description.into(),
            is_protagonist: false,
            avatar_url: None,
            personality: None,
            backstory: None,
            special_abilities: None,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn protagonist(mut self) -> Self {
        self.is_protagonist = true;
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = Some(backstory.into());
        self
    }

    pub fn with_special_abilities(mut self, abilities: Vec<String>) -> Self {
        self.special_abilities = Some(abilities);
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// A user-authored character. Unscoped - usable across universes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCharacter {
    pub id: CustomCharacterId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub special_abilities: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomCharacter {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CustomCharacterId::new(),
            user_id,
            name: name.into(),
            description: description.into(),
            personality: None,
            backstory: None,
            special_abilities: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = Some(backstory.into());
        self
    }

    pub fn with_special_abilities(mut self, abilities: Vec<String>) -> Self {
        self.special_abilities = Some(abilities);
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
