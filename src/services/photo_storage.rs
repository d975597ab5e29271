//! Almacenamiento de fotos de vehículos
//!
//! `PhotoStorage` desacopla el upload del destino físico. `LocalPhotoStorage`
//! escribe en `UPLOAD_DIR/vehicles/` y devuelve la URL pública servida bajo
//! `/uploads`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::utils::errors::{AppError, AppResult};

pub const PUBLIC_PREFIX: &str = "/uploads";
const VEHICLES_DIR: &str = "vehicles";

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Guarda el archivo y devuelve su URL pública
    async fn store(&self, file_name: &str, data: &[u8]) -> AppResult<String>;
    /// Borra el archivo detrás de una URL pública. Un archivo inexistente no es error.
    async fn remove(&self, url: &str) -> AppResult<()>;
}

pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ruta en disco de una URL pública, sólo si queda dentro del directorio raíz
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, file_name: &str, data: &[u8]) -> AppResult<String> {
        let dir = self.root.join(VEHICLES_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("No se pudo crear {}: {}", dir.display(), e)))?;

        let path = dir.join(file_name);
        fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("No se pudo escribir {}: {}", path.display(), e)))?;

        debug!("📸 Foto guardada en {}", path.display());
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, VEHICLES_DIR, file_name))
    }

    async fn remove(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.path_for_url(url) else {
            warn!("⚠️ URL de foto fuera del almacenamiento local: {}", url);
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!(
                "No se pudo borrar {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Tipos MIME aceptados y la extensión con la que se guardan
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
