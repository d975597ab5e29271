//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: &'static str,
}

impl AppError {
    /// Código HTTP asociado a cada variante.
    ///
    /// Las violaciones de unicidad (email, placa, CPF/CNPJ) se reportan como
    /// 400 igual que los errores de validación.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) | AppError::Jwt(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Dados inválidos".to_string(),
                    details: Some(json!(e)),
                    code: "VALIDATION_ERROR",
                }
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                ErrorResponse {
                    error: msg,
                    details: None,
                    code: "BAD_REQUEST",
                }
            }

            AppError::Conflict(msg) => {
                warn!("⚠️ Conflict: {}", msg);
                ErrorResponse {
                    error: msg,
                    details: None,
                    code: "CONFLICT",
                }
            }

            AppError::Unauthorized(msg) => {
                warn!("🔒 Unauthorized access: {}", msg);
                ErrorResponse {
                    error: msg,
                    details: None,
                    code: "UNAUTHORIZED",
                }
            }

            AppError::Forbidden(msg) => {
                warn!("⛔ Forbidden access: {}", msg);
                ErrorResponse {
                    error: msg,
                    details: None,
                    code: "FORBIDDEN",
                }
            }

            AppError::NotFound(msg) => {
                warn!("🔍 Resource not found: {}", msg);
                ErrorResponse {
                    error: msg,
                    details: None,
                    code: "NOT_FOUND",
                }
            }

            // Los detalles internos sólo van al log, nunca al cliente
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                internal_response("DB_ERROR")
            }

            AppError::Jwt(msg) => {
                error!("❌ JWT error: {}", msg);
                internal_response("JWT_ERROR")
            }

            AppError::Hash(msg) => {
                error!("❌ Hash error: {}", msg);
                internal_response("HASH_ERROR")
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                internal_response("INTERNAL_ERROR")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

fn internal_response(code: &'static str) -> ErrorResponse {
    ErrorResponse {
        error: "Erro interno do servidor".to_string(),
        details: None,
        code,
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación sobre un campo concreto
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    AppError::Validation(field_errors(field, message))
}

/// Construye un `ValidationErrors` con un único error de campo
pub fn field_errors(field: &'static str, message: &'static str) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, field_error(message));
    errors
}

/// Error de campo con código "custom" y mensaje legible
pub fn field_error(message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new("custom");
    error.message = Some(message.into());
    error
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(message: &str) -> AppError {
    AppError::NotFound(message.to_string())
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(message: &str) -> AppError {
    AppError::Conflict(message.to_string())
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(message: &str) -> AppError {
    AppError::Forbidden(message.to_string())
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}

/// Convierte una violación de unicidad del almacenamiento en `Conflict`;
/// cualquier otro error de base de datos se propaga tal cual.
pub fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    let is_unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_reported_as_bad_request() {
        let err = conflict_error("Placa já cadastrada");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden_error("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(not_found_error("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(internal_error("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            validation_error("email", "Email inválido").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_internal_error_does_not_leak_details() {
        let response = internal_error("connection refused at 10.0.0.3:5432").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("10.0.0.3"));
        assert!(body.contains("INTERNAL_ERROR"));
    }

    #[test]
    fn test_validation_error_carries_field() {
        match validation_error("driverLicense", "Motoristas devem informar a CNH") {
            AppError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("driverLicense"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
