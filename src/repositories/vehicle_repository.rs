use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::{NewVehicle, Vehicle, VehiclePatch};
use crate::utils::errors::{map_unique_violation, AppResult};

const PLATE_TAKEN: &str = "Placa já cadastrada";

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    /// Vehículos del motorista, más recientes primero
    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>>;
    async fn plate_exists(&self, plate: &str) -> AppResult<bool>;
    async fn update(&self, id: Uuid, patch: &VehiclePatch) -> AppResult<Option<Vehicle>>;
    /// Borra el vehículo junto con sus fotos y disponibilidades
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_availabilities(&self, vehicle_id: Uuid) -> AppResult<i64>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn create(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, user_id, vehicle_type, brand, model, year, plate,
                capacity, description, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.user_id)
        .bind(vehicle.vehicle_type)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.plate)
        .bind(vehicle.capacity)
        .bind(&vehicle.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, PLATE_TAKEN))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn plate_exists(&self, plate: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE plate = $1)")
                .bind(plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    async fn update(&self, id: Uuid, patch: &VehiclePatch) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vehicle_type = COALESCE($2, vehicle_type),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                year = COALESCE($5, year),
                plate = COALESCE($6, plate),
                capacity = COALESCE($7, capacity),
                description = COALESCE($8, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.vehicle_type)
        .bind(&patch.brand)
        .bind(&patch.model)
        .bind(patch.year)
        .bind(&patch.plate)
        .bind(patch.capacity)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, PLATE_TAKEN))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // Fotos y disponibilidades caen por ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_availabilities(&self, vehicle_id: Uuid) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM return_availabilities WHERE vehicle_id = $1")
                .bind(vehicle_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }
}
