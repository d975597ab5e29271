//! Extractores con validación
//!
//! `ValidatedJson` y `ValidatedQuery` deserializan y validan en un paso;
//! `IdPath` extrae el UUID de la ruta.
//! Cualquier rechazo de axum (JSON mal formado, tipos incorrectos, enum
//! desconocido) se convierte en `AppError::BadRequest` para que todas las
//! respuestas de error tengan la misma forma.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::utils::{errors::AppError, validation::BusinessRules};

/// Cuerpo JSON deserializado y validado
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + BusinessRules,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::BadRequest(format!("Dados inválidos: {}", rejection.body_text()))
            })?;

        value.validate_all()?;
        Ok(Self(value))
    }
}

/// Query string deserializada y validada
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + BusinessRules,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::BadRequest(format!("Parâmetros inválidos: {}", rejection.body_text()))
            })?;

        value.validate_all()?;
        Ok(Self(value))
    }
}

/// Identificador UUID tomado de la ruta (`/:id`)
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("ID inválido".to_string()))?;
        Ok(Self(id))
    }
}
