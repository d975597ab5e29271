//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Repositories;
use crate::services::photo_storage::{LocalPhotoStorage, PhotoStorage};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub photo_storage: Arc<dyn PhotoStorage>,
}

impl AppState {
    pub fn new(repos: Repositories, config: EnvironmentConfig) -> Self {
        let photo_storage = Arc::new(LocalPhotoStorage::new(config.upload_dir.clone()));
        Self {
            repos,
            jwt: JwtConfig::from(&config),
            config: Arc::new(config),
            photo_storage,
        }
    }
}
