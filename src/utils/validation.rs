//! Utilidades de validación
//!
//! Los DTOs derivan `validator::Validate` para las reglas de forma (longitud,
//! email, rangos fijos). Las reglas que dependen de varios campos o del reloj
//! se declaran con `BusinessRules::validate_rules` y se combinan en
//! `validate_all`, de modo que el cliente recibe todos los errores juntos.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::utils::errors::field_error;

/// Reglas de negocio adicionales a las derivadas de `Validate`
pub trait BusinessRules: Validate {
    fn validate_rules(&self, _errors: &mut ValidationErrors) {}

    /// Reglas de forma + reglas de negocio en un único `ValidationErrors`
    fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        self.validate_rules(&mut errors);

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Qué extremo del día representa una fecha sin hora
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    StartOfDay,
    EndOfDay,
}

/// Validar y convertir string a datetime (RFC3339)
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_date(value))
}

/// Validar y convertir string a fecha (YYYY-MM-DD)
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid_date(value))
}

/// Acepta RFC3339 o YYYY-MM-DD. Una fecha sola se interpreta en UTC al
/// inicio o al final del día según `bound`.
pub fn parse_date_input(value: &str, bound: DateBound) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if let Ok(datetime) = validate_datetime(value) {
        return Ok(datetime);
    }

    let date = validate_date(value)?;
    let naive = match bound {
        DateBound::StartOfDay => date.and_hms_opt(0, 0, 0),
        DateBound::EndOfDay => date.and_hms_milli_opt(23, 59, 59, 999),
    }
    .ok_or_else(|| invalid_date(value))?;

    Ok(Utc.from_utc_datetime(&naive))
}

fn invalid_date(value: &str) -> ValidationError {
    let mut error = ValidationError::new("date");
    error.message = Some("Data inválida".into());
    error.add_param("value".into(), &value.to_string());
    error.add_param("format".into(), &"RFC3339 ou YYYY-MM-DD".to_string());
    error
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.message = Some("Deve ser maior que zero".into());
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("Não pode ser negativo".into());
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Año de fabricación entre 1900 y el año siguiente al actual
pub fn validate_vehicle_year(year: i32) -> Result<(), ValidationError> {
    let max_year = Utc::now().year() + 1;
    validate_range(year, 1900, max_year).map_err(|mut error| {
        error.message = Some("Ano inválido".into());
        error
    })
}

/// Sigla de estado brasileño: exactamente dos letras
pub fn validate_state(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() != 2 || !trimmed.chars().all(|c| c.is_alphabetic()) {
        return Err(field_error("Estado deve ter 2 caracteres"));
    }
    Ok(())
}

/// Registra `result` en `errors` bajo `field` si es un error
pub fn collect(errors: &mut ValidationErrors, field: &'static str, result: Result<(), ValidationError>) {
    if let Err(error) = result {
        errors.add(field, error);
    }
}

/// Igual que `collect` pero para un campo opcional
pub fn collect_opt<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<T>,
    check: impl FnOnce(T) -> Result<(), ValidationError>,
) {
    if let Some(value) = value {
        collect(errors, field, check(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal::Decimal;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-15").is_ok());
        assert!(validate_date("2024/01/15").is_err());
    }

    #[test]
    fn test_parse_date_input_accepts_both_formats() {
        let full = parse_date_input("2025-03-10T14:30:00-03:00", DateBound::StartOfDay).unwrap();
        assert_eq!(full.hour(), 17);

        let start = parse_date_input("2025-03-10", DateBound::StartOfDay).unwrap();
        assert_eq!((start.hour(), start.minute()), (0, 0));

        let end = parse_date_input("2025-03-10", DateBound::EndOfDay).unwrap();
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.date_naive(), start.date_naive());

        assert!(parse_date_input("amanhã", DateBound::StartOfDay).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(Decimal::new(35, 1)).is_ok());
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_positive(-5).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(5, 1, 10).is_ok());
        assert!(validate_range(0, 1, 10).is_err());
        assert!(validate_range(15, 1, 10).is_err());
    }

    #[test]
    fn test_vehicle_year_allows_next_year_only() {
        let next = Utc::now().year() + 1;
        assert!(validate_vehicle_year(next).is_ok());
        assert!(validate_vehicle_year(next + 1).is_err());
        assert!(validate_vehicle_year(1899).is_err());
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state("SP").is_ok());
        assert!(validate_state("rj").is_ok());
        assert!(validate_state("S").is_err());
        assert!(validate_state("SPA").is_err());
        assert!(validate_state("1A").is_err());
    }
}
