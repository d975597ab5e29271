//! Middleware del sistema
//!
//! Identidad de la sesión, gate de páginas y CORS.

pub mod auth;
pub mod cors;
pub mod session_gate;

pub use auth::{AuthenticatedUser, CurrentUser, SESSION_COOKIE};
pub use cors::cors_middleware_with_origins;
pub use session_gate::session_gate;
