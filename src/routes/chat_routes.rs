use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::dto::chat_dto::{CreateChatRequest, SendMessageRequest};
use crate::middleware::auth::CurrentUser;
use crate::services::MessagingService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::extract::{IdPath, ValidatedJson};

/// Rutas de `/api/chats`
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_chats).post(create_chat))
        .route("/:id", get(get_chat))
}

/// Rutas de `/api/messages`
pub fn create_message_router() -> Router<AppState> {
    Router::new().route("/", post(send_message))
}

fn messaging(state: &AppState) -> MessagingService {
    MessagingService::new(state.repos.chats.clone(), state.repos.users.clone())
}

async fn create_chat(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateChatRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let caller = current.require_auth()?;
    let opening = messaging(&state)
        .create_or_get_chat(&caller, request.participant_id)
        .await?;

    if opening.created {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Chat criado com sucesso", "chat": opening.chat })),
        ))
    } else {
        Ok((StatusCode::OK, Json(json!({ "chat": opening.chat }))))
    }
}

async fn list_chats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    let caller = current.require_auth()?;
    let chats = messaging(&state).list_chats(&caller).await?;
    Ok(Json(json!({ "chats": chats })))
}

async fn get_chat(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let caller = current.require_auth()?;
    let chat = messaging(&state).open_chat(&caller, id).await?;
    Ok(Json(json!({ "chat": chat })))
}

async fn send_message(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let caller = current.require_auth()?;
    let message = messaging(&state)
        .send_message(&caller, request.chat_id, &request.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Mensagem enviada com sucesso", "data": message })),
    ))
}
