use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::controllers::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::extract::{IdPath, ValidatedJson};

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
}

async fn create_vehicle(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let vehicle = VehicleController::new(&state).create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Veículo criado com sucesso", "vehicle": vehicle })),
    ))
}

async fn list_vehicles(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let vehicles = VehicleController::new(&state).list_mine(&caller).await?;
    Ok(Json(json!({ "vehicles": vehicles })))
}

async fn get_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let vehicle = VehicleController::new(&state).get(id).await?;
    Ok(Json(json!({ "vehicle": vehicle })))
}

async fn update_vehicle(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    let vehicle = VehicleController::new(&state).update(&caller, id, request).await?;
    Ok(Json(json!({ "message": "Veículo atualizado com sucesso", "vehicle": vehicle })))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<Value>> {
    let caller = current.require_role(&[UserRole::Driver])?;
    VehicleController::new(&state).delete(&caller, id).await?;
    Ok(Json(json!({ "message": "Veículo excluído com sucesso" })))
}
