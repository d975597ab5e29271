//! Modelo de ReturnAvailability
//!
//! Una disponibilidad de retorno es la oferta de un motorista: ruta,
//! fecha, capacidad libre y precio estimado. Mapea la tabla
//! `return_availabilities`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::user::DriverContact;
use crate::models::vehicle::{Vehicle, VehiclePhoto, VehicleType};

/// Estado de la disponibilidad - mapea al ENUM availability_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "availability_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Active,
    Inactive,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAvailability {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub origin_city: String,
    pub origin_state: String,
    pub destination_city: String,
    pub destination_state: String,
    pub available_date: DateTime<Utc>,
    pub flexible_dates: bool,
    pub available_capacity: Decimal,
    pub price_estimate: Option<Decimal>,
    pub status: AvailabilityStatus,
    pub description: Option<String>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos ya validados y sanitizados para insertar una disponibilidad
#[derive(Debug, Clone)]
pub struct NewAvailability {
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub origin_city: String,
    pub origin_state: String,
    pub destination_city: String,
    pub destination_state: String,
    pub available_date: DateTime<Utc>,
    pub flexible_dates: bool,
    pub available_capacity: Decimal,
    pub price_estimate: Option<Decimal>,
    pub description: Option<String>,
    pub observations: Option<String>,
}

impl NewAvailability {
    pub fn into_availability(self, id: Uuid, now: DateTime<Utc>) -> ReturnAvailability {
        ReturnAvailability {
            id,
            user_id: self.user_id,
            vehicle_id: self.vehicle_id,
            origin_city: self.origin_city,
            origin_state: self.origin_state,
            destination_city: self.destination_city,
            destination_state: self.destination_state,
            available_date: self.available_date,
            flexible_dates: self.flexible_dates,
            available_capacity: self.available_capacity,
            price_estimate: self.price_estimate,
            status: AvailabilityStatus::Active,
            description: self.description,
            observations: self.observations,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cambios parciales. El estado puede pasar a cualquier valor.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityPatch {
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub available_date: Option<DateTime<Utc>>,
    pub flexible_dates: Option<bool>,
    pub available_capacity: Option<Decimal>,
    pub price_estimate: Option<Decimal>,
    pub status: Option<AvailabilityStatus>,
    pub description: Option<String>,
    pub observations: Option<String>,
}

impl AvailabilityPatch {
    pub fn apply(&self, availability: &mut ReturnAvailability) {
        if let Some(v) = &self.origin_city {
            availability.origin_city = v.clone();
        }
        if let Some(v) = &self.origin_state {
            availability.origin_state = v.clone();
        }
        if let Some(v) = &self.destination_city {
            availability.destination_city = v.clone();
        }
        if let Some(v) = &self.destination_state {
            availability.destination_state = v.clone();
        }
        if let Some(v) = self.available_date {
            availability.available_date = v;
        }
        if let Some(v) = self.flexible_dates {
            availability.flexible_dates = v;
        }
        if let Some(v) = self.available_capacity {
            availability.available_capacity = v;
        }
        if let Some(v) = self.price_estimate {
            availability.price_estimate = Some(v);
        }
        if let Some(v) = self.status {
            availability.status = v;
        }
        if let Some(v) = &self.description {
            availability.description = Some(v.clone());
        }
        if let Some(v) = &self.observations {
            availability.observations = Some(v.clone());
        }
    }
}

/// Filtro de consulta sobre disponibilidades.
///
/// Las ciudades se comparan como subcadena sin distinguir mayúsculas; los
/// estados por igualdad exacta (ya normalizados a mayúsculas).
#[derive(Debug, Clone, Default)]
pub struct AvailabilityFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<AvailabilityStatus>,
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub min_capacity: Option<Decimal>,
    pub vehicle_type: Option<VehicleType>,
}

impl AvailabilityFilter {
    pub fn matches(&self, availability: &ReturnAvailability, vehicle: &Vehicle) -> bool {
        if let Some(owner_id) = self.owner_id {
            if availability.user_id != owner_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if availability.status != status {
                return false;
            }
        }
        if let Some(city) = &self.origin_city {
            if !contains_ignore_case(&availability.origin_city, city) {
                return false;
            }
        }
        if let Some(state) = &self.origin_state {
            if &availability.origin_state != state {
                return false;
            }
        }
        if let Some(city) = &self.destination_city {
            if !contains_ignore_case(&availability.destination_city, city) {
                return false;
            }
        }
        if let Some(state) = &self.destination_state {
            if &availability.destination_state != state {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if availability.available_date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if availability.available_date > to {
                return false;
            }
        }
        if let Some(min) = self.min_capacity {
            if availability.available_capacity < min {
                return false;
            }
        }
        if let Some(vehicle_type) = self.vehicle_type {
            if vehicle.vehicle_type != vehicle_type {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Orden del listado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityOrder {
    /// Más recientes primero (listado propio del motorista)
    CreatedDesc,
    /// Fecha disponible más próxima primero (clientes y búsqueda)
    AvailableDateAsc,
}

/// Ventana de paginación ya calculada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

/// Resumen del vehículo que acompaña a cada disponibilidad listada
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub capacity: Decimal,
    pub primary_photo: Option<String>,
}

impl VehicleSummary {
    pub fn from_vehicle(vehicle: &Vehicle, primary_photo: Option<String>) -> Self {
        Self {
            id: vehicle.id,
            vehicle_type: vehicle.vehicle_type,
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            capacity: vehicle.capacity,
            primary_photo,
        }
    }
}

/// Disponibilidad con vehículo y motorista, tal como se lista
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityListing {
    #[serde(flatten)]
    pub availability: ReturnAvailability,
    pub vehicle: VehicleSummary,
    pub user: DriverContact,
}

/// Detalle de una disponibilidad: vehículo completo con fotos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDetail {
    #[serde(flatten)]
    pub availability: ReturnAvailability,
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
    pub user: DriverContact,
}
