//! Rutas HTTP
//!
//! Cada módulo expone un `create_*_router()` que se anida bajo `/api`.

pub mod auth_routes;
pub mod availability_routes;
pub mod chat_routes;
pub mod photo_routes;
pub mod user_routes;
pub mod vehicle_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Router de `/api`
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .nest("/users", user_routes::create_user_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/availabilities", availability_routes::create_availability_router())
        .nest("/chats", chat_routes::create_chat_router())
        .nest("/messages", chat_routes::create_message_router())
        .nest("/upload", photo_routes::create_upload_router())
        .nest("/photos", photo_routes::create_photo_router())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
