//! Utilidades del sistema
//!
//! Manejo de errores, validación, extractores, JWT y sanitización de texto.

pub mod errors;
pub mod extract;
pub mod jwt;
pub mod sanitize;
pub mod validation;
