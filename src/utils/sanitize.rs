//! Sanitización de texto libre
//!
//! Todo texto libre que llega de los clientes pasa por aquí antes de
//! persistirse: se recorta y se eliminan las etiquetas HTML/script.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_PATTERN: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Recorta espacios y elimina cualquier etiqueta `<...>`
pub fn sanitize_input(input: &str) -> String {
    TAG_PATTERN.replace_all(input.trim(), "").into_owned()
}

/// Variante para campos opcionales
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_input)
}

/// Normaliza una sigla de estado (UF) a mayúsculas
pub fn normalize_state(state: &str) -> String {
    state.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_tags() {
        assert_eq!(
            sanitize_input("  Olá <script>alert('x')</script>mundo "),
            "Olá alert('x')mundo"
        );
    }

    #[test]
    fn test_keeps_plain_text() {
        assert_eq!(sanitize_input("São Paulo"), "São Paulo");
    }

    #[test]
    fn test_strips_attributes_inside_tags() {
        assert_eq!(sanitize_input("<b class=\"x\">Scania</b>"), "Scania");
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state(" sp"), "SP");
    }
}
