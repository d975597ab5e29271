use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserPatch};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn cpf_cnpj_exists(&self, cpf_cnpj: &str) -> AppResult<bool>;
    async fn update(&self, id: Uuid, patch: &UserPatch) -> AppResult<Option<User>>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Traduce las violaciones de unicidad de `users` al mensaje correcto
fn map_user_error(e: sqlx::Error) -> AppError {
    let constraint = e
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string());

    match constraint.as_deref() {
        Some("users_cpf_cnpj_key") => AppError::Conflict("CPF/CNPJ já cadastrado".to_string()),
        Some(_) => AppError::Conflict("Email já cadastrado".to_string()),
        None => AppError::Database(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, password_hash, name, role, phone, whatsapp,
                cpf_cnpj, driver_license, company_name, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role)
        .bind(&user.phone)
        .bind(&user.whatsapp)
        .bind(&user.cpf_cnpj)
        .bind(&user.driver_license)
        .bind(&user.company_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_error)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    async fn cpf_cnpj_exists(&self, cpf_cnpj: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE cpf_cnpj = $1)")
                .bind(cpf_cnpj)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                whatsapp = COALESCE($4, whatsapp),
                cpf_cnpj = COALESCE($5, cpf_cnpj),
                driver_license = COALESCE($6, driver_license),
                company_name = COALESCE($7, company_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.phone)
        .bind(&patch.whatsapp)
        .bind(&patch.cpf_cnpj)
        .bind(&patch.driver_license)
        .bind(&patch.company_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_error)
    }
}
