//! Autenticación y autorización
//!
//! `CurrentUser` resuelve la identidad de la sesión (cookie `session-token` o
//! header `Authorization: Bearer`). Un token ausente, inválido, expirado o de
//! un usuario que ya no existe equivale a "sin identidad"; cada handler decide
//! después con `require_auth` / `require_role` / `ensure_owner`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::user::{User, UserRole},
    state::AppState,
    utils::{
        errors::{AppError, AppResult},
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Nombre de la cookie de sesión
pub const SESSION_COOKIE: &str = "session-token";

/// Usuario autenticado que se pasa explícitamente a cada operación
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

impl AuthenticatedUser {
    pub fn is_driver(&self) -> bool {
        self.role == UserRole::Driver
    }

    pub fn is_client(&self) -> bool {
        self.role == UserRole::Client
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Falla con `Forbidden` si el recurso pertenece a otro usuario
    pub fn ensure_owner(&self, owner_id: Uuid) -> AppResult<()> {
        if self.id != owner_id {
            return Err(AppError::Forbidden("Acesso negado".to_string()));
        }
        Ok(())
    }
}

/// Identidad opcional de la request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl CurrentUser {
    pub fn get(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }

    pub fn require_auth(self) -> AppResult<AuthenticatedUser> {
        self.0
            .ok_or_else(|| AppError::Unauthorized("Não autorizado".to_string()))
    }

    pub fn require_role(self, allowed: &[UserRole]) -> AppResult<AuthenticatedUser> {
        let user = self.require_auth()?;
        if !allowed.contains(&user.role) {
            return Err(AppError::Forbidden(
                "Acesso negado: permissão insuficiente".to_string(),
            ));
        }
        Ok(user)
    }
}

/// Token de sesión de la request: primero la cookie, luego el header Bearer
pub fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_token_from_header)
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(Self(None));
        };

        let claims = match verify_token(&token, &state.jwt) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("🔒 Sesión ignorada: {}", e);
                return Ok(Self(None));
            }
        };

        let Ok(user_id) = claims.user_id() else {
            return Ok(Self(None));
        };

        let user = state.repos.users.find_by_id(user_id).await?;
        Ok(Self(user.map(AuthenticatedUser::from)))
    }
}
