use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::availability::{
    AvailabilityFilter, AvailabilityListing, AvailabilityStatus, Window,
};
use crate::models::vehicle::VehicleType;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::sanitize::normalize_state;
use crate::utils::validation::{
    collect, collect_opt, parse_date_input, validate_non_negative, validate_positive,
    validate_state, BusinessRules, DateBound,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Convierte un campo de fecha ya validado
fn parse_field(field: &'static str, value: &str, bound: DateBound) -> AppResult<DateTime<Utc>> {
    parse_date_input(value, bound).map_err(|_| validation_error(field, "Data inválida"))
}

fn check_date(value: &str) -> Result<(), validator::ValidationError> {
    parse_date_input(value, DateBound::StartOfDay).map(|_| ())
}

// Request para crear una disponibilidad
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvailabilityRequest {
    pub vehicle_id: Uuid,
    #[validate(length(min = 2, message = "Cidade de origem inválida"))]
    pub origin_city: String,
    pub origin_state: String,
    #[validate(length(min = 2, message = "Cidade de destino inválida"))]
    pub destination_city: String,
    pub destination_state: String,
    pub available_date: String,
    #[serde(default)]
    pub flexible_dates: bool,
    pub available_capacity: Decimal,
    pub price_estimate: Option<Decimal>,
    pub description: Option<String>,
    pub observations: Option<String>,
}

impl BusinessRules for CreateAvailabilityRequest {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        collect(errors, "originState", validate_state(&self.origin_state));
        collect(errors, "destinationState", validate_state(&self.destination_state));
        collect(errors, "availableDate", check_date(&self.available_date));
        collect(errors, "availableCapacity", validate_positive(self.available_capacity));
        collect_opt(errors, "priceEstimate", self.price_estimate, validate_positive);
    }
}

impl CreateAvailabilityRequest {
    pub fn available_date(&self) -> AppResult<DateTime<Utc>> {
        parse_field("availableDate", &self.available_date, DateBound::StartOfDay)
    }
}

// Request para actualizar una disponibilidad
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    #[validate(length(min = 2, message = "Cidade de origem inválida"))]
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    #[validate(length(min = 2, message = "Cidade de destino inválida"))]
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub available_date: Option<String>,
    pub flexible_dates: Option<bool>,
    pub available_capacity: Option<Decimal>,
    pub price_estimate: Option<Decimal>,
    pub status: Option<AvailabilityStatus>,
    pub description: Option<String>,
    pub observations: Option<String>,
}

impl BusinessRules for UpdateAvailabilityRequest {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        collect_opt(errors, "originState", self.origin_state.as_deref(), validate_state);
        collect_opt(errors, "destinationState", self.destination_state.as_deref(), validate_state);
        collect_opt(errors, "availableDate", self.available_date.as_deref(), check_date);
        collect_opt(errors, "availableCapacity", self.available_capacity, validate_positive);
        collect_opt(errors, "priceEstimate", self.price_estimate, validate_positive);
    }
}

impl UpdateAvailabilityRequest {
    pub fn available_date(&self) -> AppResult<Option<DateTime<Utc>>> {
        self.available_date
            .as_deref()
            .map(|value| parse_field("availableDate", value, DateBound::StartOfDay))
            .transpose()
    }
}

// Query de búsqueda de disponibilidades
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchAvailabilityQuery {
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_capacity: Option<Decimal>,
    pub vehicle_type: Option<VehicleType>,
    #[validate(range(min = 1, message = "Página deve ser maior ou igual a 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "Limite deve estar entre 1 e 100"))]
    pub limit: Option<i64>,
}

/// Parámetros vacíos (`?originCity=`) cuentan como ausentes
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BusinessRules for SearchAvailabilityQuery {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        collect_opt(errors, "originState", present(&self.origin_state), validate_state);
        collect_opt(errors, "destinationState", present(&self.destination_state), validate_state);
        collect_opt(errors, "dateFrom", present(&self.date_from), check_date);
        collect_opt(errors, "dateTo", present(&self.date_to), check_date);
        collect_opt(errors, "minCapacity", self.min_capacity, validate_non_negative);
    }
}

impl SearchAvailabilityQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn window(&self) -> Window {
        Window {
            offset: (self.page() - 1).saturating_mul(self.limit()),
            limit: self.limit(),
        }
    }

    /// Filtro de búsqueda: siempre ACTIVE; sin rango de fechas, sólo futuras
    pub fn to_filter(&self, now: DateTime<Utc>) -> AppResult<AvailabilityFilter> {
        let date_from = present(&self.date_from)
            .map(|value| parse_field("dateFrom", value, DateBound::StartOfDay))
            .transpose()?;
        let date_to = present(&self.date_to)
            .map(|value| parse_field("dateTo", value, DateBound::EndOfDay))
            .transpose()?;

        let date_from = match (date_from, date_to) {
            (None, None) => Some(now),
            (from, _) => from,
        };

        Ok(AvailabilityFilter {
            owner_id: None,
            status: Some(AvailabilityStatus::Active),
            origin_city: present(&self.origin_city).map(str::to_string),
            origin_state: present(&self.origin_state).map(normalize_state),
            destination_city: present(&self.destination_city).map(str::to_string),
            destination_state: present(&self.destination_state).map(normalize_state),
            date_from,
            date_to,
            min_capacity: self.min_capacity,
            vehicle_type: self.vehicle_type,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

// Response de búsqueda
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub availabilities: Vec<AvailabilityListing>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    #[test]
    fn test_pagination_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        assert_eq!(Pagination::new(2, 10, 95).total_pages, 10);
    }

    #[test]
    fn test_window_from_page_and_limit() {
        let query = SearchAvailabilityQuery {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(query.window(), Window { offset: 20, limit: 10 });
        assert_eq!(SearchAvailabilityQuery::default().window(), Window { offset: 0, limit: 20 });
    }

    #[test]
    fn test_far_page_saturates_offset() {
        let query = SearchAvailabilityQuery {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        };
        assert!(query.validate_all().is_ok());
        assert_eq!(query.window(), Window { offset: i64::MAX, limit: 100 });
    }

    #[test]
    fn test_min_capacity_keeps_decimal_precision() {
        let query: SearchAvailabilityQuery =
            serde_urlencoded::from_str("minCapacity=0.1&destinationState=SP").unwrap();
        assert!(query.validate_all().is_ok());

        let filter = query.to_filter(Utc::now()).unwrap();
        assert_eq!(filter.min_capacity, Some(Decimal::new(1, 1)));

        let negative: SearchAvailabilityQuery = serde_urlencoded::from_str("minCapacity=-1").unwrap();
        assert!(negative.validate_all().is_err());
    }

    #[test]
    fn test_page_and_limit_bounds() {
        let zero_page = SearchAvailabilityQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(zero_page.validate_all().is_err());

        let huge_limit = SearchAvailabilityQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(huge_limit.validate_all().is_err());
    }

    #[test]
    fn test_filter_defaults_to_future_only() {
        let now = Utc::now();
        let filter = SearchAvailabilityQuery::default().to_filter(now).unwrap();
        assert_eq!(filter.date_from, Some(now));
        assert_eq!(filter.date_to, None);
        assert_eq!(filter.status, Some(AvailabilityStatus::Active));
    }

    #[test]
    fn test_date_to_only_keeps_past_dates_and_covers_whole_day() {
        let query = SearchAvailabilityQuery {
            date_to: Some("2030-05-10".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter(Utc::now()).unwrap();
        assert_eq!(filter.date_from, None);
        let to = filter.date_to.unwrap();
        assert_eq!((to.hour(), to.minute()), (23, 59));
    }

    #[test]
    fn test_states_are_normalized_and_blank_params_ignored() {
        let query = SearchAvailabilityQuery {
            destination_state: Some("sp".to_string()),
            origin_city: Some("  ".to_string()),
            min_capacity: Some(Decimal::new(105, 1)),
            ..Default::default()
        };
        assert!(query.validate_all().is_ok());
        let filter = query.to_filter(Utc::now() - Duration::days(1)).unwrap();
        assert_eq!(filter.destination_state.as_deref(), Some("SP"));
        assert_eq!(filter.origin_city, None);
        assert_eq!(filter.min_capacity, Some(Decimal::new(105, 1)));
    }

    #[test]
    fn test_create_rejects_bad_state_and_date() {
        let request: CreateAvailabilityRequest = serde_json::from_value(serde_json::json!({
            "vehicleId": Uuid::new_v4(),
            "originCity": "Rio de Janeiro",
            "originState": "RJX",
            "destinationCity": "São Paulo",
            "destinationState": "SP",
            "availableDate": "amanhã",
            "availableCapacity": 10
        }))
        .unwrap();

        let errors = request.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("originState"));
        assert!(fields.contains_key("availableDate"));
        assert!(!fields.contains_key("destinationState"));
        assert!(!request.flexible_dates);
    }
}
