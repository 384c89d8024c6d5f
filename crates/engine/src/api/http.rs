//! HTTP routes.
//!
//! Authentication is handled upstream; handlers trust the `x-user-id`
//! header set by the auth collaborator and reject requests without one.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use taleforge_domain::{
    CharacterId, CharacterRef, Chat, ChatId, CustomCharacterId, CustomUniverseId, Message,
    UniverseId, UniverseRef, UserId,
};

use crate::app::App;
use crate::use_cases::{
    CharacterDraft, CharacterOpsError, ChatOpsError, NewChat, NewCharacter, SendMessageError,
    SendOutcome, SuggestionContext, SuggestionError, SuggestionField, SuggestionTarget,
    UniverseDraft, UniverseOpsError, UniverseUpdate,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/chats", get(list_chats).post(create_chat))
        .route(
            "/api/chats/{id}",
            get(get_chat).put(rename_chat).delete(delete_chat),
        )
        .route(
            "/api/chats/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/api/universes", get(list_universes).post(create_universe))
        .route("/api/universes/{id}", get(get_universe).put(update_universe))
        .route("/api/universes/{id}/characters", get(list_universe_characters))
        .route(
            "/api/custom-universes",
            get(list_custom_universes).post(create_custom_universe),
        )
        .route(
            "/api/custom-universes/{id}",
            get(get_custom_universe)
                .put(update_custom_universe)
                .delete(delete_custom_universe),
        )
        .route("/api/characters", post(create_character))
        .route("/api/characters/protagonists", get(list_protagonists))
        .route("/api/characters/{id}", get(get_character))
        .route(
            "/api/custom-characters",
            get(list_custom_characters).post(create_custom_character),
        )
        .route(
            "/api/custom-characters/{id}",
            get(get_custom_character)
                .put(update_custom_character)
                .delete(delete_custom_character),
        )
        .route("/api/suggestions", post(suggest_field))
        .route("/api/seed", post(seed))
}

async fn health() -> &'static str {
    "OK"
}

/// Pull the authenticated user out of the `x-user-id` header.
fn user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get("x-user-id")
        .ok_or(ApiError::Unauthorized)?
        .to_str()
        .map_err(|_| ApiError::Unauthorized)?;
    let uuid = Uuid::parse_str(value).map_err(|_| ApiError::Unauthorized)?;
    Ok(UserId::from_uuid(uuid))
}

// =============================================================================
// Chats
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateChatBody {
    title: Option<String>,
    model: Option<String>,
    universe: Option<UniverseRef>,
    character: Option<CharacterRef>,
}

async fn list_chats(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Chat>>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(app.use_cases.chat_ops.list(user).await?))
}

async fn create_chat(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<CreateChatBody>,
) -> Result<Json<Chat>, ApiError> {
    let user = user_id(&headers)?;
    let chat = app
        .use_cases
        .chat_ops
        .create(
            user,
            NewChat {
                title: body.title,
                model: body.model,
                universe: body.universe,
                character: body.character,
            },
        )
        .await?;
    Ok(Json(chat))
}

async fn get_chat(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Chat>, ApiError> {
    let user = user_id(&headers)?;
    let chat = app
        .use_cases
        .chat_ops
        .get(user, ChatId::from_uuid(id))
        .await?;
    Ok(Json(chat))
}

#[derive(Debug, Deserialize)]
struct RenameChatBody {
    title: String,
}

async fn rename_chat(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<RenameChatBody>,
) -> Result<Json<Chat>, ApiError> {
    let user = user_id(&headers)?;
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    let chat = app
        .use_cases
        .chat_ops
        .rename(user, ChatId::from_uuid(id), &body.title)
        .await?;
    Ok(Json(chat))
}

async fn delete_chat(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_id(&headers)?;
    app.use_cases
        .chat_ops
        .delete(user, ChatId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Messages
// =============================================================================

async fn list_messages(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user = user_id(&headers)?;
    let chat_id = ChatId::from_uuid(id);
    // Non-owners and missing chats both see an empty history.
    if app.entities.chats.get_owned(chat_id, user).await?.is_none() {
        return Ok(Json(Vec::new()));
    }
    let messages = app.entities.messages.list_for_chat(chat_id).await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
struct SendMessageBody {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageReply {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn send_message(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<SendMessageReply>, ApiError> {
    let user = user_id(&headers)?;
    let outcome = app
        .use_cases
        .send_message
        .execute(user, ChatId::from_uuid(id), &body.content)
        .await?;
    let reply = match outcome {
        SendOutcome::Reply { content } => SendMessageReply {
            success: true,
            response: Some(content),
            error: None,
        },
        SendOutcome::Failed { error } => SendMessageReply {
            success: false,
            response: None,
            error: Some(error),
        },
        SendOutcome::Empty => {
            return Err(ApiError::BadRequest("message content is required".to_string()))
        }
    };
    Ok(Json(reply))
}

// =============================================================================
// Universes
// =============================================================================

async fn list_universes(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<taleforge_domain::Universe>>, ApiError> {
    Ok(Json(app.use_cases.universe_ops.list_active().await?))
}

async fn get_universe(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<taleforge_domain::Universe>, ApiError> {
    let universe = app
        .use_cases
        .universe_ops
        .get(UniverseId::from_uuid(id))
        .await?;
    Ok(Json(universe))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CharacterListQuery {
    protagonists: bool,
}

async fn list_universe_characters(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Query(query): Query<CharacterListQuery>,
) -> Result<Json<Vec<taleforge_domain::Character>>, ApiError> {
    let characters = app
        .use_cases
        .character_ops
        .list_for_universe(UniverseId::from_uuid(id), query.protagonists)
        .await?;
    Ok(Json(characters))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseDraftBody {
    name: String,
    #[serde(default)]
    description: String,
    system_prompt: String,
    game_instructions: Option<String>,
}

impl From<UniverseDraftBody> for UniverseDraft {
    fn from(body: UniverseDraftBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            system_prompt: body.system_prompt,
            game_instructions: body.game_instructions,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UniverseUpdateBody {
    name: Option<String>,
    description: Option<String>,
    system_prompt: Option<String>,
    game_instructions: Option<String>,
    is_active: Option<bool>,
}

async fn create_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<UniverseDraftBody>,
) -> Result<Json<taleforge_domain::Universe>, ApiError> {
    user_id(&headers)?;
    let universe = app.use_cases.universe_ops.create(body.into()).await?;
    Ok(Json(universe))
}

async fn update_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UniverseUpdateBody>,
) -> Result<Json<taleforge_domain::Universe>, ApiError> {
    user_id(&headers)?;
    let universe = app
        .use_cases
        .universe_ops
        .update(
            UniverseId::from_uuid(id),
            UniverseUpdate {
                name: body.name,
                description: body.description,
                system_prompt: body.system_prompt,
                game_instructions: body.game_instructions,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(universe))
}

async fn list_custom_universes(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Vec<taleforge_domain::CustomUniverse>>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(app.use_cases.universe_ops.list_custom(user).await?))
}

async fn create_custom_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<UniverseDraftBody>,
) -> Result<Json<taleforge_domain::CustomUniverse>, ApiError> {
    let user = user_id(&headers)?;
    let universe = app
        .use_cases
        .universe_ops
        .create_custom(user, body.into())
        .await?;
    Ok(Json(universe))
}

async fn get_custom_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<taleforge_domain::CustomUniverse>, ApiError> {
    let user = user_id(&headers)?;
    let universe = app
        .use_cases
        .universe_ops
        .get_custom(user, CustomUniverseId::from_uuid(id))
        .await?;
    Ok(Json(universe))
}

async fn update_custom_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UniverseDraftBody>,
) -> Result<Json<taleforge_domain::CustomUniverse>, ApiError> {
    let user = user_id(&headers)?;
    let universe = app
        .use_cases
        .universe_ops
        .update_custom(user, CustomUniverseId::from_uuid(id), body.into())
        .await?;
    Ok(Json(universe))
}

async fn delete_custom_universe(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_id(&headers)?;
    app.use_cases
        .universe_ops
        .delete_custom(user, CustomUniverseId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Characters
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterDraftBody {
    name: String,
    #[serde(default)]
    description: String,
    personality: Option<String>,
    backstory: Option<String>,
    special_abilities: Option<Vec<String>>,
}

impl From<CharacterDraftBody> for CharacterDraft {
    fn from(body: CharacterDraftBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            personality: body.personality,
            backstory: body.backstory,
            special_abilities: body.special_abilities,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCharacterBody {
    universe_id: Uuid,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_protagonist: bool,
    avatar_url: Option<String>,
    personality: Option<String>,
    backstory: Option<String>,
    special_abilities: Option<Vec<String>>,
}

async fn create_character(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<CreateCharacterBody>,
) -> Result<Json<taleforge_domain::Character>, ApiError> {
    user_id(&headers)?;
    let character = app
        .use_cases
        .character_ops
        .create(NewCharacter {
            universe_id: UniverseId::from_uuid(body.universe_id),
            name: body.name,
            description: body.description,
            is_protagonist: body.is_protagonist,
            avatar_url: body.avatar_url,
            personality: body.personality,
            backstory: body.backstory,
            special_abilities: body.special_abilities,
        })
        .await?;
    Ok(Json(character))
}

async fn list_protagonists(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<taleforge_domain::Character>>, ApiError> {
    Ok(Json(app.use_cases.character_ops.list_protagonists().await?))
}

async fn get_character(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<taleforge_domain::Character>, ApiError> {
    let character = app
        .use_cases
        .character_ops
        .get(CharacterId::from_uuid(id))
        .await?;
    Ok(Json(character))
}

async fn list_custom_characters(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Vec<taleforge_domain::CustomCharacter>>, ApiError> {
    let user = user_id(&headers)?;
    Ok(Json(app.use_cases.character_ops.list_custom(user).await?))
}

async fn create_custom_character(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<CharacterDraftBody>,
) -> Result<Json<taleforge_domain::CustomCharacter>, ApiError> {
    let user = user_id(&headers)?;
    let character = app
        .use_cases
        .character_ops
        .create_custom(user, body.into())
        .await?;
    Ok(Json(character))
}

async fn get_custom_character(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<taleforge_domain::CustomCharacter>, ApiError> {
    let user = user_id(&headers)?;
    let character = app
        .use_cases
        .character_ops
        .get_custom(user, CustomCharacterId::from_uuid(id))
        .await?;
    Ok(Json(character))
}

async fn update_custom_character(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<CharacterDraftBody>,
) -> Result<Json<taleforge_domain::CustomCharacter>, ApiError> {
    let user = user_id(&headers)?;
    let character = app
        .use_cases
        .character_ops
        .update_custom(user, CustomCharacterId::from_uuid(id), body.into())
        .await?;
    Ok(Json(character))
}

async fn delete_custom_character(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_id(&headers)?;
    app.use_cases
        .character_ops
        .delete_custom(user, CustomCharacterId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// Suggestions & seed
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionBody {
    target: SuggestionTarget,
    field: SuggestionField,
    name: String,
    #[serde(default)]
    context: SuggestionContext,
}

#[derive(Debug, Serialize)]
struct SuggestionReply {
    suggestion: String,
}

async fn suggest_field(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<SuggestionBody>,
) -> Result<Json<SuggestionReply>, ApiError> {
    user_id(&headers)?;
    let suggestion = app
        .use_cases
        .suggestions
        .suggest(body.target, body.field, &body.name, &body.context)
        .await?;
    Ok(Json(SuggestionReply { suggestion }))
}

async fn seed(State(app): State<Arc<App>>) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = app.use_cases.seed.run().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "created": outcome == crate::use_cases::SeedOutcome::Created,
    })))
}

// =============================================================================
// Errors
// =============================================================================

pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::BadRequest(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Unauthorized => (
                axum::http::StatusCode::UNAUTHORIZED,
                "Missing or invalid x-user-id header",
            )
                .into_response(),
            ApiError::Internal(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
            )
                .into_response(),
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ChatOpsError> for ApiError {
    fn from(e: ChatOpsError) -> Self {
        match e {
            ChatOpsError::NotFound => ApiError::NotFound,
            ChatOpsError::Persistence(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UniverseOpsError> for ApiError {
    fn from(e: UniverseOpsError) -> Self {
        match e {
            UniverseOpsError::NotFound => ApiError::NotFound,
            UniverseOpsError::Invalid(msg) => ApiError::BadRequest(msg),
            UniverseOpsError::Persistence(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CharacterOpsError> for ApiError {
    fn from(e: CharacterOpsError) -> Self {
        match e {
            CharacterOpsError::NotFound => ApiError::NotFound,
            CharacterOpsError::Invalid(msg) => ApiError::BadRequest(msg),
            CharacterOpsError::Persistence(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::ChatNotFound => ApiError::NotFound,
            SendMessageError::Persistence(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SuggestionError> for ApiError {
    fn from(e: SuggestionError) -> Self {
        match e {
            SuggestionError::FieldMismatch(field, target) => {
                ApiError::BadRequest(format!("{field} is not a {target} field"))
            }
            SuggestionError::Generation(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}
