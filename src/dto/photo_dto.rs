use axum::{body::Bytes, extract::Multipart};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::{bad_request_error, AppError, AppResult};
use crate::utils::validation::BusinessRules;

/// Tamaño máximo de una foto (5 MB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Archivo recibido en el formulario
#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: String,
    pub data: Bytes,
}

/// Formulario multipart de upload: `file`, `vehicleId`, `isPrimary`
#[derive(Debug)]
pub struct PhotoUploadForm {
    pub vehicle_id: Uuid,
    pub is_primary: bool,
    pub file: UploadedFile,
}

impl PhotoUploadForm {
    /// Lee todos los campos; los desconocidos se ignoran
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut file = None;
        let mut vehicle_id = None;
        let mut is_primary = false;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            match field.name().unwrap_or_default() {
                "file" => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;
                    file = Some(UploadedFile { content_type, data });
                }
                "vehicleId" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    vehicle_id = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                "isPrimary" => {
                    is_primary = field.text().await.map_err(multipart_error)?.trim() == "true";
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| bad_request_error("Nenhum arquivo enviado"))?;
        let vehicle_id = vehicle_id.ok_or_else(|| bad_request_error("ID do veículo é obrigatório"))?;
        let vehicle_id =
            Uuid::parse_str(&vehicle_id).map_err(|_| bad_request_error("ID do veículo inválido"))?;

        Ok(Self {
            vehicle_id,
            is_primary,
            file,
        })
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Formulário inválido: {}", e.body_text()))
}

/// Query de `DELETE /api/upload?id=`
#[derive(Debug, Deserialize, Validate)]
pub struct DeletePhotoQuery {
    pub id: Option<String>,
}

impl BusinessRules for DeletePhotoQuery {}

impl DeletePhotoQuery {
    pub fn photo_id(&self) -> AppResult<Uuid> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| bad_request_error("ID da foto é obrigatório"))?;

        Uuid::parse_str(id).map_err(|_| bad_request_error("ID da foto inválido"))
    }
}
