use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::availability::{
    AvailabilityFilter, AvailabilityListing, AvailabilityOrder, AvailabilityPatch, NewAvailability,
    ReturnAvailability, VehicleSummary, Window,
};
use crate::models::user::DriverContact;
use crate::models::vehicle::VehicleType;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn create(&self, availability: NewAvailability) -> AppResult<ReturnAvailability>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ReturnAvailability>>;
    async fn update(&self, id: Uuid, patch: &AvailabilityPatch) -> AppResult<Option<ReturnAvailability>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    /// Disponibilidades que cumplen el filtro, con vehículo y motorista.
    /// Sin ventana se devuelven todas.
    async fn list(
        &self,
        filter: &AvailabilityFilter,
        order: AvailabilityOrder,
        window: Option<Window>,
    ) -> AppResult<Vec<AvailabilityListing>>;
    async fn count(&self, filter: &AvailabilityFilter) -> AppResult<i64>;
}

pub struct PgAvailabilityRepository {
    pool: PgPool,
}

impl PgAvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Fila plana del listado: la disponibilidad más columnas con prefijo del
/// vehículo y del motorista
#[derive(FromRow)]
struct AvailabilityListingRow {
    #[sqlx(flatten)]
    availability: ReturnAvailability,
    vehicle_type: VehicleType,
    vehicle_brand: String,
    vehicle_model: String,
    vehicle_year: i32,
    vehicle_capacity: Decimal,
    vehicle_primary_photo: Option<String>,
    driver_name: String,
    driver_phone: Option<String>,
    driver_whatsapp: Option<String>,
    driver_company_name: Option<String>,
}

impl From<AvailabilityListingRow> for AvailabilityListing {
    fn from(row: AvailabilityListingRow) -> Self {
        let vehicle = VehicleSummary {
            id: row.availability.vehicle_id,
            vehicle_type: row.vehicle_type,
            brand: row.vehicle_brand,
            model: row.vehicle_model,
            year: row.vehicle_year,
            capacity: row.vehicle_capacity,
            primary_photo: row.vehicle_primary_photo,
        };
        let user = DriverContact {
            id: row.availability.user_id,
            name: row.driver_name,
            phone: row.driver_phone,
            whatsapp: row.driver_whatsapp,
            company_name: row.driver_company_name,
            driver_license: None,
        };

        AvailabilityListing {
            availability: row.availability,
            vehicle,
            user,
        }
    }
}

const LISTING_SELECT: &str = r#"
    SELECT a.*,
           v.vehicle_type AS vehicle_type,
           v.brand AS vehicle_brand,
           v.model AS vehicle_model,
           v.year AS vehicle_year,
           v.capacity AS vehicle_capacity,
           (SELECT p.url FROM vehicle_photos p
             WHERE p.vehicle_id = v.id AND p.is_primary
             LIMIT 1) AS vehicle_primary_photo,
           u.name AS driver_name,
           u.phone AS driver_phone,
           u.whatsapp AS driver_whatsapp,
           u.company_name AS driver_company_name
    FROM return_availabilities a
    JOIN vehicles v ON v.id = a.vehicle_id
    JOIN users u ON u.id = a.user_id
"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM return_availabilities a
    JOIN vehicles v ON v.id = a.vehicle_id
"#;

/// Patrón ILIKE de subcadena con los comodines del término escapados
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AvailabilityFilter) {
    qb.push(" WHERE TRUE");

    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND a.user_id = ").push_bind(owner_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND a.status = ").push_bind(status);
    }
    if let Some(city) = &filter.origin_city {
        qb.push(" AND a.origin_city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(state) = &filter.origin_state {
        qb.push(" AND a.origin_state = ").push_bind(state.clone());
    }
    if let Some(city) = &filter.destination_city {
        qb.push(" AND a.destination_city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(state) = &filter.destination_state {
        qb.push(" AND a.destination_state = ").push_bind(state.clone());
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND a.available_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND a.available_date <= ").push_bind(to);
    }
    if let Some(min_capacity) = filter.min_capacity {
        qb.push(" AND a.available_capacity >= ").push_bind(min_capacity);
    }
    if let Some(vehicle_type) = filter.vehicle_type {
        qb.push(" AND v.vehicle_type = ").push_bind(vehicle_type);
    }
}

#[async_trait]
impl AvailabilityRepository for PgAvailabilityRepository {
    async fn create(&self, availability: NewAvailability) -> AppResult<ReturnAvailability> {
        let created = sqlx::query_as::<_, ReturnAvailability>(
            r#"
            INSERT INTO return_availabilities (
                id, user_id, vehicle_id, origin_city, origin_state,
                destination_city, destination_state, available_date, flexible_dates,
                available_capacity, price_estimate, status, description, observations,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'ACTIVE', $12, $13, $14, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(availability.user_id)
        .bind(availability.vehicle_id)
        .bind(&availability.origin_city)
        .bind(&availability.origin_state)
        .bind(&availability.destination_city)
        .bind(&availability.destination_state)
        .bind(availability.available_date)
        .bind(availability.flexible_dates)
        .bind(availability.available_capacity)
        .bind(availability.price_estimate)
        .bind(&availability.description)
        .bind(&availability.observations)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ReturnAvailability>> {
        let availability = sqlx::query_as::<_, ReturnAvailability>(
            "SELECT * FROM return_availabilities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(availability)
    }

    async fn update(&self, id: Uuid, patch: &AvailabilityPatch) -> AppResult<Option<ReturnAvailability>> {
        let updated = sqlx::query_as::<_, ReturnAvailability>(
            r#"
            UPDATE return_availabilities
            SET origin_city = COALESCE($2, origin_city),
                origin_state = COALESCE($3, origin_state),
                destination_city = COALESCE($4, destination_city),
                destination_state = COALESCE($5, destination_state),
                available_date = COALESCE($6, available_date),
                flexible_dates = COALESCE($7, flexible_dates),
                available_capacity = COALESCE($8, available_capacity),
                price_estimate = COALESCE($9, price_estimate),
                status = COALESCE($10, status),
                description = COALESCE($11, description),
                observations = COALESCE($12, observations),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.origin_city)
        .bind(&patch.origin_state)
        .bind(&patch.destination_city)
        .bind(&patch.destination_state)
        .bind(patch.available_date)
        .bind(patch.flexible_dates)
        .bind(patch.available_capacity)
        .bind(patch.price_estimate)
        .bind(patch.status)
        .bind(&patch.description)
        .bind(&patch.observations)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM return_availabilities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: &AvailabilityFilter,
        order: AvailabilityOrder,
        window: Option<Window>,
    ) -> AppResult<Vec<AvailabilityListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_filter(&mut qb, filter);

        match order {
            AvailabilityOrder::CreatedDesc => qb.push(" ORDER BY a.created_at DESC"),
            AvailabilityOrder::AvailableDateAsc => qb.push(" ORDER BY a.available_date ASC"),
        };

        if let Some(window) = window {
            qb.push(" LIMIT ").push_bind(window.limit);
            qb.push(" OFFSET ").push_bind(window.offset);
        }

        let rows = qb
            .build_query_as::<AvailabilityListingRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AvailabilityListing::from).collect())
    }

    async fn count(&self, filter: &AvailabilityFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new(COUNT_SELECT);
        push_filter(&mut qb, filter);

        let total: (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(total.0)
    }
}
