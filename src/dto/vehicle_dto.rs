use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::models::vehicle::VehicleType;
use crate::utils::validation::{
    collect, collect_opt, validate_positive, validate_vehicle_year, BusinessRules,
};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[validate(length(min = 2, message = "Marca deve ter no mínimo 2 caracteres"))]
    pub brand: String,
    #[validate(length(min = 2, message = "Modelo deve ter no mínimo 2 caracteres"))]
    pub model: String,
    pub year: i32,
    #[validate(length(min = 7, message = "Placa inválida"))]
    pub plate: String,
    pub capacity: Decimal,
    pub description: Option<String>,
}

impl BusinessRules for CreateVehicleRequest {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        collect(errors, "year", validate_vehicle_year(self.year));
        collect(errors, "capacity", validate_positive(self.capacity));
    }
}

// Request para actualizar un vehículo
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,
    #[validate(length(min = 2, message = "Marca deve ter no mínimo 2 caracteres"))]
    pub brand: Option<String>,
    #[validate(length(min = 2, message = "Modelo deve ter no mínimo 2 caracteres"))]
    pub model: Option<String>,
    pub year: Option<i32>,
    #[validate(length(min = 7, message = "Placa inválida"))]
    pub plate: Option<String>,
    pub capacity: Option<Decimal>,
    pub description: Option<String>,
}

impl BusinessRules for UpdateVehicleRequest {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        collect_opt(errors, "year", self.year, validate_vehicle_year);
        collect_opt(errors, "capacity", self.capacity, validate_positive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    fn request() -> CreateVehicleRequest {
        serde_json::from_value(serde_json::json!({
            "type": "TRUCK_LARGE",
            "brand": "Scania",
            "model": "R 450",
            "year": 2020,
            "plate": "ABC1D23",
            "capacity": 25
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_vehicle() {
        let vehicle = request();
        assert_eq!(vehicle.vehicle_type, VehicleType::TruckLarge);
        assert!(vehicle.validate_all().is_ok());
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let mut vehicle = request();
        vehicle.capacity = Decimal::ZERO;
        let errors = vehicle.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }

    #[test]
    fn test_year_beyond_next_year_is_rejected() {
        let mut vehicle = request();
        vehicle.year = Utc::now().year() + 2;
        assert!(vehicle.validate_all().is_err());
    }

    #[test]
    fn test_unknown_vehicle_type_does_not_deserialize() {
        let result: Result<CreateVehicleRequest, _> = serde_json::from_value(serde_json::json!({
            "type": "SPACESHIP",
            "brand": "X",
            "model": "Y",
            "year": 2020,
            "plate": "ABC1D23",
            "capacity": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_update_only_checks_present_fields() {
        assert!(UpdateVehicleRequest::default().validate_all().is_ok());

        let short_plate = UpdateVehicleRequest {
            plate: Some("AB1".to_string()),
            ..Default::default()
        };
        assert!(short_plate.validate_all().is_err());
    }
}
