//! Backend del marketplace de fletes de retorno
//!
//! Motoristas publican sus viajes de vuelta con capacidad libre; clientes
//! buscan esas ofertas y conversan con el motorista por chat.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{extract::DefaultBodyLimit, middleware::from_fn, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{cors_middleware_with_origins, session_gate};
use crate::services::photo_storage::PUBLIC_PREFIX;
use crate::state::AppState;

/// Límite del cuerpo de las requests; el tamaño de cada foto se valida aparte
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Router completo de la aplicación con todas sus capas
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let cors = cors_middleware_with_origins(&state.config.cors_origins);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", routes::create_api_router())
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(from_fn(session_gate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors)
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .with_state(state)
}
