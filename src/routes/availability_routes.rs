use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::controllers::AvailabilityController;
use crate::dto::availability_dto::{
    CreateAvailabilityRequest, SearchAvailabilityQuery, SearchResponse, UpdateAvailabilityRequest,
};
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::services::SearchService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::extract::{IdPath, ValidatedJson, ValidatedQuery};

pub fn create_availability_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_availabilities).post(create_availability))
        .route("/search", get(search_availabilities))
        .route(
            "/:id",
            get(get_availability)
                .patch(update_availability)
                .delete(delete_availability),
        )
}

async fn create_availability(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateAvailabilityRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let availability = AvailabilityController::new(&state)
        .create(&caller, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Disponibilidade criada com sucesso",
            "availability": availability
        })),
    ))
}

async fn list_availabilities(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    let caller = current.require_auth()?;
    let availabilities = AvailabilityController::new(&state).list(&caller).await?;
    Ok(Json(json!({ "availabilities": availabilities })))
}

/// Búsqueda pública, no requiere sesión
async fn search_availabilities(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchAvailabilityQuery>,
) -> AppResult<Json<SearchResponse>> {
    let service = SearchService::new(state.repos.availabilities.clone());
    Ok(Json(service.search(&query).await?))
}

async fn get_availability(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let availability = AvailabilityController::new(&state).get(id).await?;
    Ok(Json(json!({ "availability": availability })))
}

async fn update_availability(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateAvailabilityRequest>,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let availability = AvailabilityController::new(&state)
        .update(&caller, id, request)
        .await?;
    Ok(Json(json!({
        "message": "Disponibilidade atualizada com sucesso",
        "availability": availability
    })))
}

async fn delete_availability(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    AvailabilityController::new(&state).delete(&caller, id).await?;
    Ok(Json(json!({ "message": "Disponibilidade excluída com sucesso" })))
}
