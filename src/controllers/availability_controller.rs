use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::availability_dto::{CreateAvailabilityRequest, UpdateAvailabilityRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::availability::{
    AvailabilityDetail, AvailabilityFilter, AvailabilityListing, AvailabilityOrder,
    AvailabilityPatch, AvailabilityStatus, NewAvailability, ReturnAvailability, Window,
};
use crate::models::user::DriverContact;
use crate::repositories::{AvailabilityRepository, PhotoRepository, UserRepository, VehicleRepository};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};
use crate::utils::sanitize::{normalize_state, sanitize_input, sanitize_optional};

/// Máximo de disponibilidades en el listado para clientes
pub const CLIENT_LIST_LIMIT: i64 = 50;

pub struct AvailabilityController {
    availabilities: Arc<dyn AvailabilityRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    photos: Arc<dyn PhotoRepository>,
    users: Arc<dyn UserRepository>,
}

impl AvailabilityController {
    pub fn new(state: &AppState) -> Self {
        Self {
            availabilities: state.repos.availabilities.clone(),
            vehicles: state.repos.vehicles.clone(),
            photos: state.repos.photos.clone(),
            users: state.repos.users.clone(),
        }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateAvailabilityRequest,
    ) -> AppResult<AvailabilityDetail> {
        let available_date = request.available_date()?;

        let vehicle = match self.vehicles.find_by_id(request.vehicle_id).await? {
            Some(vehicle) if vehicle.user_id == caller.id => vehicle,
            _ => return Err(forbidden_error("Veículo não encontrado ou sem permissão")),
        };

        if request.available_capacity > vehicle.capacity {
            warn!(
                "⚠️ Capacidad ofrecida {} supera la del vehículo {} ({})",
                request.available_capacity, vehicle.plate, vehicle.capacity
            );
        }

        let availability = self
            .availabilities
            .create(NewAvailability {
                user_id: caller.id,
                vehicle_id: vehicle.id,
                origin_city: sanitize_input(&request.origin_city),
                origin_state: normalize_state(&request.origin_state),
                destination_city: sanitize_input(&request.destination_city),
                destination_state: normalize_state(&request.destination_state),
                available_date,
                flexible_dates: request.flexible_dates,
                available_capacity: request.available_capacity,
                price_estimate: request.price_estimate,
                description: sanitize_optional(request.description.as_deref()),
                observations: sanitize_optional(request.observations.as_deref()),
            })
            .await?;

        info!(
            "🛣️ Disponibilidad {} creada: {}/{} → {}/{}",
            availability.id,
            availability.origin_city,
            availability.origin_state,
            availability.destination_city,
            availability.destination_state
        );
        self.detail(availability).await
    }

    /// Motorista: sus propias ofertas, más recientes primero.
    /// Cliente o admin: ofertas activas futuras, fecha más próxima primero.
    pub async fn list(&self, caller: &AuthenticatedUser) -> AppResult<Vec<AvailabilityListing>> {
        if caller.is_driver() {
            let filter = AvailabilityFilter {
                owner_id: Some(caller.id),
                ..Default::default()
            };
            return self
                .availabilities
                .list(&filter, AvailabilityOrder::CreatedDesc, None)
                .await;
        }

        let filter = AvailabilityFilter {
            status: Some(AvailabilityStatus::Active),
            date_from: Some(Utc::now()),
            ..Default::default()
        };
        let window = Window {
            offset: 0,
            limit: CLIENT_LIST_LIMIT,
        };
        self.availabilities
            .list(&filter, AvailabilityOrder::AvailableDateAsc, Some(window))
            .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<AvailabilityDetail> {
        let availability = self.find(id).await?;
        self.detail(availability).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> AppResult<AvailabilityDetail> {
        let current = self.find(id).await?;
        caller.ensure_owner(current.user_id)?;

        let patch = AvailabilityPatch {
            origin_city: sanitize_optional(request.origin_city.as_deref()),
            origin_state: request.origin_state.as_deref().map(normalize_state),
            destination_city: sanitize_optional(request.destination_city.as_deref()),
            destination_state: request.destination_state.as_deref().map(normalize_state),
            available_date: request.available_date()?,
            flexible_dates: request.flexible_dates,
            available_capacity: request.available_capacity,
            price_estimate: request.price_estimate,
            status: request.status,
            description: sanitize_optional(request.description.as_deref()),
            observations: sanitize_optional(request.observations.as_deref()),
        };

        let availability = self
            .availabilities
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found_error("Disponibilidade não encontrada"))?;

        info!("🛣️ Disponibilidad {} actualizada ({:?})", availability.id, availability.status);
        self.detail(availability).await
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let current = self.find(id).await?;
        caller.ensure_owner(current.user_id)?;

        if !self.availabilities.delete(id).await? {
            return Err(not_found_error("Disponibilidade não encontrada"));
        }

        info!("🗑️ Disponibilidad {} eliminada", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<ReturnAvailability> {
        self.availabilities
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Disponibilidade não encontrada"))
    }

    /// Vehículo completo con fotos y contacto del motorista
    async fn detail(&self, availability: ReturnAvailability) -> AppResult<AvailabilityDetail> {
        let vehicle = self
            .vehicles
            .find_by_id(availability.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Veículo não encontrado"))?;
        let photos = self.photos.list_by_vehicle(vehicle.id).await?;
        let driver = self
            .users
            .find_by_id(availability.user_id)
            .await?
            .ok_or_else(|| not_found_error("Motorista não encontrado"))?;

        Ok(AvailabilityDetail {
            availability,
            vehicle,
            photos,
            user: DriverContact::from_user(&driver, false),
        })
    }
}
