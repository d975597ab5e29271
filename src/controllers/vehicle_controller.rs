use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::DriverContact;
use crate::models::vehicle::{
    NewVehicle, Vehicle, VehicleDetail, VehicleOverview, VehiclePatch, VehicleWithPhotos,
};
use crate::repositories::{PhotoRepository, UserRepository, VehicleRepository};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};
use crate::utils::sanitize::{sanitize_input, sanitize_optional};

pub struct VehicleController {
    vehicles: Arc<dyn VehicleRepository>,
    photos: Arc<dyn PhotoRepository>,
    users: Arc<dyn UserRepository>,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: state.repos.vehicles.clone(),
            photos: state.repos.photos.clone(),
            users: state.repos.users.clone(),
        }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> AppResult<VehicleWithPhotos> {
        let plate = normalize_plate(&request.plate);

        // Verificar que la placa no exista
        if self.vehicles.plate_exists(&plate).await? {
            return Err(conflict_error("Placa já cadastrada"));
        }

        let vehicle = self
            .vehicles
            .create(NewVehicle {
                user_id: caller.id,
                vehicle_type: request.vehicle_type,
                brand: sanitize_input(&request.brand),
                model: sanitize_input(&request.model),
                year: request.year,
                plate,
                capacity: request.capacity,
                description: sanitize_optional(request.description.as_deref()),
            })
            .await?;

        info!("🚚 Vehículo {} creado por {}", vehicle.plate, caller.email);
        Ok(VehicleWithPhotos {
            vehicle,
            photos: Vec::new(),
        })
    }

    /// Vehículos del motorista, más recientes primero
    pub async fn list_mine(&self, caller: &AuthenticatedUser) -> AppResult<Vec<VehicleOverview>> {
        let vehicles = self.vehicles.find_by_owner(caller.id).await?;

        let mut overviews = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            let photos = self.photos.list_by_vehicle(vehicle.id).await?;
            let availability_count = self.vehicles.count_availabilities(vehicle.id).await?;
            overviews.push(VehicleOverview {
                vehicle,
                photos,
                availability_count,
            });
        }

        Ok(overviews)
    }

    /// Detalle público con fotos y contacto del dueño
    pub async fn get(&self, id: Uuid) -> AppResult<VehicleDetail> {
        let vehicle = self.find(id).await?;
        let photos = self.photos.list_by_vehicle(vehicle.id).await?;
        let owner = self
            .users
            .find_by_id(vehicle.user_id)
            .await?
            .ok_or_else(|| not_found_error("Motorista não encontrado"))?;

        Ok(VehicleDetail {
            vehicle,
            photos,
            user: DriverContact::from_user(&owner, false),
        })
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<VehicleWithPhotos> {
        let current = self.find(id).await?;
        caller.ensure_owner(current.user_id)?;

        let plate = request.plate.as_deref().map(normalize_plate);
        if let Some(plate) = &plate {
            if plate != &current.plate && self.vehicles.plate_exists(plate).await? {
                return Err(conflict_error("Placa já cadastrada"));
            }
        }

        let patch = VehiclePatch {
            vehicle_type: request.vehicle_type,
            brand: sanitize_optional(request.brand.as_deref()),
            model: sanitize_optional(request.model.as_deref()),
            year: request.year,
            plate,
            capacity: request.capacity,
            description: sanitize_optional(request.description.as_deref()),
        };

        let vehicle = self
            .vehicles
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found_error("Veículo não encontrado"))?;
        let photos = self.photos.list_by_vehicle(vehicle.id).await?;

        info!("🚚 Vehículo {} actualizado", vehicle.plate);
        Ok(VehicleWithPhotos { vehicle, photos })
    }

    /// Borra el vehículo con sus fotos y disponibilidades
    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let current = self.find(id).await?;
        caller.ensure_owner(current.user_id)?;

        if !self.vehicles.delete(id).await? {
            return Err(not_found_error("Veículo não encontrado"));
        }

        info!("🗑️ Vehículo {} eliminado", current.plate);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Vehicle> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Veículo não encontrado"))
    }
}

/// Placas se guardan sin espacios y en mayúsculas
fn normalize_plate(plate: &str) -> String {
    sanitize_input(plate).to_uppercase()
}
