use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};
use tracing::info;

use crate::controllers::UserController;
use crate::dto::user_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::extract::ValidatedJson;

/// Configura las rutas de autenticación
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = UserController::new(&state).register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Usuário criado com sucesso", "user": user })),
    ))
}

/// Login: devuelve el token y además lo deja en la cookie de sesión
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let response = UserController::new(&state).login(request).await?;

    let cookie = Cookie::build((SESSION_COOKIE, response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session_cookie_secure);

    Ok((jar.add(cookie), Json(response)))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    info!("👋 Sesión cerrada");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "message": "Logout realizado com sucesso" })))
}
