use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::controllers::UserController;
use crate::dto::user_dto::{UpdateProfileRequest, UserResponse};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::extract::ValidatedJson;

pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(update_profile))
}

async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let caller = current.require_auth()?;
    let profile = UserController::new(&state).get_profile(&caller).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<Value>> {
    let caller = current.require_auth()?;
    let user = UserController::new(&state).update_profile(&caller, request).await?;
    Ok(Json(json!({ "message": "Perfil atualizado com sucesso", "user": user })))
}
