//! Chat entity - One conversation between a user and the narrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::{CharacterId, ChatId, CustomCharacterId, CustomUniverseId, UniverseId, UserId};

/// Reference from a chat to its story setting.
///
/// A chat points at either a shared universe or one the owner authored,
/// never both. The sum type makes that invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum UniverseRef {
    Standard(UniverseId),
    Custom(CustomUniverseId),
}

impl UniverseRef {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard(_) => "standard",
            Self::Custom(_) => "custom",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Standard(id) => id.to_uuid(),
            Self::Custom(id) => id.to_uuid(),
        }
    }

    pub fn from_parts(kind: &str, id: Uuid) -> Result<Self, DomainError> {
        match kind {
            "standard" => Ok(Self::Standard(UniverseId::from_uuid(id))),
            "custom" => Ok(Self::Custom(CustomUniverseId::from_uuid(id))),
            other => Err(DomainError::InvalidId(format!(
                "unknown universe ref kind: {other}"
            ))),
        }
    }
}

/// Reference from a chat to the persona the user embodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum CharacterRef {
    Standard(CharacterId),
    Custom(CustomCharacterId),
}

impl CharacterRef {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard(_) => "standard",
            Self::Custom(_) => "custom",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Standard(id) => id.to_uuid(),
            Self::Custom(id) => id.to_uuid(),
        }
    }

    pub fn from_parts(kind: &str, id: Uuid) -> Result<Self, DomainError> {
        match kind {
            "standard" => Ok(Self::Standard(CharacterId::from_uuid(id))),
            "custom" => Ok(Self::Custom(CustomCharacterId::from_uuid(id))),
            other => Err(DomainError::InvalidId(format!(
                "unknown character ref kind: {other}"
            ))),
        }
    }
}

/// A conversation owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub user_id: UserId,
    pub title: String,
    /// Provider model override; the client default applies when unset.
    pub model: Option<String>,
    pub universe: Option<UniverseRef>,
    pub character: Option<CharacterRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(user_id: UserId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ChatId::new(),
            user_id,
            title: title.into(),
            model: None,
            universe: None,
            character: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_universe(mut self, universe: UniverseRef) -> Self {
        self.universe = Some(universe);
        self
    }

    pub fn with_character(mut self, character: CharacterRef) -> Self {
        self.character = Some(character);
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn universe_ref_serializes_as_tagged_kind_and_id() {
        let id = UniverseId::new();
        let json = serde_json::to_value(UniverseRef::Standard(id)).unwrap();
        assert_eq!(json["kind"], "standard");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn ref_kind_and_id_round_trip_through_from_parts() {
        let original = CharacterRef::Custom(CustomCharacterId::new());
        let rebuilt = CharacterRef::from_parts(original.kind(), original.id()).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn from_parts_rejects_unknown_kinds() {
        assert!(UniverseRef::from_parts("cosmic", Uuid::new_v4()).is_err());
    }

    #[test]
    fn ownership_is_exact_user_match() {
        let owner = UserId::new();
        let chat = Chat::new(owner, "New Adventure", Utc::now());
        assert!(chat.is_owned_by(owner));
        assert!(!chat.is_owned_by(UserId::new()));
    }
}
