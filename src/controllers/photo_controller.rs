use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::photo_dto::{PhotoUploadForm, MAX_PHOTO_SIZE};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::vehicle::VehiclePhoto;
use crate::repositories::{PhotoRepository, VehicleRepository};
use crate::services::photo_storage::{extension_for_mime, PhotoStorage};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, forbidden_error, not_found_error, AppResult};

pub struct PhotoController {
    vehicles: Arc<dyn VehicleRepository>,
    photos: Arc<dyn PhotoRepository>,
    storage: Arc<dyn PhotoStorage>,
}

impl PhotoController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: state.repos.vehicles.clone(),
            photos: state.repos.photos.clone(),
            storage: state.photo_storage.clone(),
        }
    }

    /// Guarda el archivo y después crea el registro.
    ///
    /// Orden de chequeos: dueño del vehículo, tipo MIME, tamaño.
    pub async fn upload(
        &self,
        caller: &AuthenticatedUser,
        form: PhotoUploadForm,
    ) -> AppResult<VehiclePhoto> {
        let vehicle = self.vehicles.find_by_id(form.vehicle_id).await?;
        match vehicle {
            Some(vehicle) if vehicle.user_id == caller.id => {}
            _ => return Err(forbidden_error("Veículo não encontrado ou sem permissão")),
        }

        let extension = extension_for_mime(&form.file.content_type).ok_or_else(|| {
            bad_request_error("Tipo de arquivo não permitido. Use JPEG, PNG ou WebP")
        })?;

        if form.file.data.len() > MAX_PHOTO_SIZE {
            return Err(bad_request_error("Arquivo muito grande. Tamanho máximo: 5MB"));
        }

        let file_name = format!("{}-{}.{}", form.vehicle_id, Uuid::new_v4(), extension);
        let url = self.storage.store(&file_name, &form.file.data).await?;

        let photo = match self
            .photos
            .create(form.vehicle_id, url.clone(), form.is_primary)
            .await
        {
            Ok(photo) => photo,
            Err(e) => {
                // Sin registro el archivo queda huérfano
                if let Err(remove_err) = self.storage.remove(&url).await {
                    warn!("⚠️ No se pudo borrar {}: {}", url, remove_err);
                }
                return Err(e);
            }
        };

        info!(
            "📸 Foto {} subida para vehículo {} (principal: {})",
            photo.id, photo.vehicle_id, photo.is_primary
        );
        Ok(photo)
    }

    /// Marca la foto como principal y desmarca las demás del vehículo
    pub async fn set_primary(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<VehiclePhoto> {
        let photo = self.owned_photo(caller, id).await?;

        let photo = self
            .photos
            .set_primary(photo.id)
            .await?
            .ok_or_else(|| not_found_error("Foto não encontrada"))?;

        info!("⭐ Foto {} marcada como principal", photo.id);
        Ok(photo)
    }

    /// Borra el registro; el archivo se borra en modo best-effort
    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let photo = self.owned_photo(caller, id).await?;

        if !self.photos.delete(photo.id).await? {
            return Err(not_found_error("Foto não encontrada"));
        }

        if let Err(e) = self.storage.remove(&photo.url).await {
            warn!("⚠️ Foto {} borrada pero el archivo quedó: {}", photo.id, e);
        }

        info!("🗑️ Foto {} eliminada", photo.id);
        Ok(())
    }

    async fn owned_photo(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<VehiclePhoto> {
        let photo = self
            .photos
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Foto não encontrada"))?;

        let vehicle = self
            .vehicles
            .find_by_id(photo.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Foto não encontrada"))?;

        caller.ensure_owner(vehicle.user_id)?;
        Ok(photo)
    }
}
