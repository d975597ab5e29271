use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::controllers::PhotoController;
use crate::dto::photo_dto::{DeletePhotoQuery, PhotoUploadForm};
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::extract::{IdPath, ValidatedQuery};

/// Rutas de `/api/upload`
pub fn create_upload_router() -> Router<AppState> {
    Router::new().route("/", post(upload_photo).delete(delete_photo))
}

/// Rutas de `/api/photos`
pub fn create_photo_router() -> Router<AppState> {
    Router::new().route("/:id/primary", patch(set_primary_photo))
}

async fn upload_photo(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(format!("Formulário inválido: {}", rejection.body_text()))
    })?;
    let form = PhotoUploadForm::from_multipart(multipart).await?;
    let photo = PhotoController::new(&state).upload(&caller, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Foto enviada com sucesso", "photo": photo })),
    ))
}

async fn delete_photo(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedQuery(query): ValidatedQuery<DeletePhotoQuery>,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let id = query.photo_id()?;
    PhotoController::new(&state).delete(&caller, id).await?;
    Ok(Json(json!({ "message": "Foto excluída com sucesso" })))
}

async fn set_primary_photo(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let photo = PhotoController::new(&state).set_primary(&caller, id).await?;
    Ok(Json(json!({ "message": "Foto principal atualizada", "photo": photo })))
}
