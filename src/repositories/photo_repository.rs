use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::VehiclePhoto;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Registra una foto. Si es primaria, las demás del vehículo dejan de serlo
    /// en la misma operación.
    async fn create(&self, vehicle_id: Uuid, url: String, is_primary: bool) -> AppResult<VehiclePhoto>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>>;
    /// Fotos del vehículo, primaria primero
    async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<VehiclePhoto>>;
    async fn primary_url(&self, vehicle_id: Uuid) -> AppResult<Option<String>>;
    async fn set_primary(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn create(&self, vehicle_id: Uuid, url: String, is_primary: bool) -> AppResult<VehiclePhoto> {
        let mut tx = self.pool.begin().await?;

        if is_primary {
            sqlx::query(
                "UPDATE vehicle_photos SET is_primary = FALSE WHERE vehicle_id = $1 AND is_primary",
            )
            .bind(vehicle_id)
            .execute(&mut *tx)
            .await?;
        }

        let photo = sqlx::query_as::<_, VehiclePhoto>(
            r#"
            INSERT INTO vehicle_photos (id, vehicle_id, url, is_primary, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(&url)
        .bind(is_primary)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(photo)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        let photo = sqlx::query_as::<_, VehiclePhoto>("SELECT * FROM vehicle_photos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(photo)
    }

    async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<VehiclePhoto>> {
        let photos = sqlx::query_as::<_, VehiclePhoto>(
            r#"
            SELECT * FROM vehicle_photos
            WHERE vehicle_id = $1
            ORDER BY is_primary DESC, created_at ASC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn primary_url(&self, vehicle_id: Uuid) -> AppResult<Option<String>> {
        let url: Option<(String,)> = sqlx::query_as(
            "SELECT url FROM vehicle_photos WHERE vehicle_id = $1 AND is_primary LIMIT 1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(url.map(|(url,)| url))
    }

    async fn set_primary(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        let mut tx = self.pool.begin().await?;

        let Some(photo) =
            sqlx::query_as::<_, VehiclePhoto>("SELECT * FROM vehicle_photos WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };

        sqlx::query("UPDATE vehicle_photos SET is_primary = FALSE WHERE vehicle_id = $1 AND is_primary")
            .bind(photo.vehicle_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, VehiclePhoto>(
            "UPDATE vehicle_photos SET is_primary = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicle_photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
