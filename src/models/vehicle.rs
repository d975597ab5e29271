//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus fotos y las variantes para
//! operaciones CRUD. Mapea las tablas `vehicles` y `vehicle_photos`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::user::DriverContact;

/// Categoría del vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    TruckSmall,
    TruckMedium,
    TruckLarge,
    TruckSemi,
    TruckBi,
    TruckRodotrem,
    Van,
    Pickup,
    Other,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate: String,
    pub capacity: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos ya validados y sanitizados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub user_id: Uuid,
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub plate: String,
    pub capacity: Decimal,
    pub description: Option<String>,
}

impl NewVehicle {
    pub fn into_vehicle(self, id: Uuid, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id,
            user_id: self.user_id,
            vehicle_type: self.vehicle_type,
            brand: self.brand,
            model: self.model,
            year: self.year,
            plate: self.plate,
            capacity: self.capacity,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cambios parciales sobre un vehículo
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub vehicle_type: Option<VehicleType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate: Option<String>,
    pub capacity: Option<Decimal>,
    pub description: Option<String>,
}

impl VehiclePatch {
    pub fn apply(&self, vehicle: &mut Vehicle) {
        if let Some(vehicle_type) = self.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(brand) = &self.brand {
            vehicle.brand = brand.clone();
        }
        if let Some(model) = &self.model {
            vehicle.model = model.clone();
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if let Some(plate) = &self.plate {
            vehicle.plate = plate.clone();
        }
        if let Some(capacity) = self.capacity {
            vehicle.capacity = capacity;
        }
        if let Some(description) = &self.description {
            vehicle.description = Some(description.clone());
        }
    }
}

/// Foto de vehículo - mapea a la tabla vehicle_photos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePhoto {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub url: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Vehículo con sus fotos (primaria primero)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleWithPhotos {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
}

/// Entrada del listado "mis vehículos"
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleOverview {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
    pub availability_count: i64,
}

/// Detalle público de un vehículo con el contacto del dueño
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
    pub user: DriverContact,
}

/// Ordena las fotos con la primaria primero y luego por fecha de subida
pub fn sort_primary_first(photos: &mut [VehiclePhoto]) {
    photos.sort_by(|a, b| {
        b.is_primary
            .cmp(&a.is_primary)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}
