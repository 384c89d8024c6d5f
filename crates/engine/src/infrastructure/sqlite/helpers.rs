//! Row conversion helpers shared by the SQLite repositories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::infrastructure::ports::RepoError;

/// Parse a stored RFC 3339 timestamp.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("invalid timestamp '{value}': {e}")))
}

/// Parse a stored UUID column.
pub fn parse_uuid(value: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(value)
        .map_err(|e| RepoError::serialization(format!("invalid id '{value}': {e}")))
}

/// Decode the JSON-encoded `special_abilities` column.
pub fn parse_abilities(value: Option<String>) -> Result<Option<Vec<String>>, RepoError> {
    value
        .map(|json| serde_json::from_str(&json).map_err(RepoError::serialization))
        .transpose()
}

/// Encode the `special_abilities` column.
pub fn encode_abilities(abilities: Option<&Vec<String>>) -> Result<Option<String>, RepoError> {
    abilities
        .map(|list| serde_json::to_string(list).map_err(RepoError::serialization))
        .transpose()
}
