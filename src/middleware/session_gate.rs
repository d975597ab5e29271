//! Gate de sesión para rutas de páginas
//!
//! Sólo mira si la cookie de sesión está presente; la validez del token la
//! comprueban los handlers con `require_auth`.
//! - `/dashboard*` sin cookie → 303 a `/login?from=<ruta original>`
//! - `/login` o `/register` con cookie → 303 a `/dashboard`

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::auth::SESSION_COOKIE;

pub async fn session_gate(request: Request, next: Next) -> Response {
    let has_session = CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .is_some();

    let uri = request.uri();
    if let Some(target) = gate_redirect(uri.path(), uri.query(), has_session) {
        return Redirect::to(&target).into_response();
    }

    next.run(request).await
}

/// Destino de la redirección, o `None` si la request sigue su curso
fn gate_redirect(path: &str, query: Option<&str>, has_session: bool) -> Option<String> {
    let is_protected = path == "/dashboard" || path.starts_with("/dashboard/");
    let is_auth_page = matches!(path, "/login" | "/register");

    if is_protected && !has_session {
        let original = match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        };
        return Some(format!("/login?from={}", urlencoding::encode(&original)));
    }

    if is_auth_page && has_session {
        return Some("/dashboard".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_path_without_session_goes_to_login() {
        assert_eq!(
            gate_redirect("/dashboard/vehicles", Some("page=2"), false),
            Some("/login?from=%2Fdashboard%2Fvehicles%3Fpage%3D2".to_string())
        );
        assert_eq!(
            gate_redirect("/dashboard", None, false),
            Some("/login?from=%2Fdashboard".to_string())
        );
    }

    #[test]
    fn test_auth_pages_with_session_go_to_dashboard() {
        assert_eq!(gate_redirect("/login", None, true), Some("/dashboard".to_string()));
        assert_eq!(gate_redirect("/register", None, true), Some("/dashboard".to_string()));
    }

    #[test]
    fn test_other_paths_pass_through() {
        assert_eq!(gate_redirect("/dashboard", None, true), None);
        assert_eq!(gate_redirect("/login", None, false), None);
        assert_eq!(gate_redirect("/dashboarding", None, false), None);
        assert_eq!(gate_redirect("/api/vehicles", None, false), None);
    }
}
