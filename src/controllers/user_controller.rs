use std::sync::Arc;

use bcrypt::{hash, verify};
use tracing::info;

use crate::dto::user_dto::{
    LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{NewUser, UserPatch};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::sanitize::{sanitize_input, sanitize_optional};

pub struct UserController {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.repos.users.clone(),
            jwt: state.jwt.clone(),
            bcrypt_cost: state.config.bcrypt_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserResponse> {
        let email = normalize_email(&request.email);

        // Verificar unicidad antes de hashear
        if self.users.email_exists(&email).await? {
            return Err(conflict_error("Email já cadastrado"));
        }

        let cpf_cnpj = sanitize_optional(request.cpf_cnpj.as_deref()).filter(|v| !v.is_empty());
        if let Some(cpf_cnpj) = &cpf_cnpj {
            if self.users.cpf_cnpj_exists(cpf_cnpj).await? {
                return Err(conflict_error("CPF/CNPJ já cadastrado"));
            }
        }

        let password_hash = hash(&request.password, self.bcrypt_cost)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name: sanitize_input(&request.name),
                role: request.role,
                phone: sanitize_optional(request.phone.as_deref()),
                whatsapp: sanitize_optional(request.whatsapp.as_deref()),
                cpf_cnpj,
                driver_license: sanitize_optional(request.driver_license.as_deref()),
                company_name: sanitize_optional(request.company_name.as_deref()),
            })
            .await?;

        info!("👤 Usuario registrado: {} ({})", user.email, user.role.as_str());
        Ok(UserResponse::from(user))
    }

    /// Credenciales incorrectas y email desconocido responden igual
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&request.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(invalid_credentials());
        }

        let token = generate_token(user.id, user.role, &self.jwt)?;

        info!("🔐 Login exitoso: {}", user.email);
        Ok(LoginResponse {
            message: "Login realizado com sucesso",
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn get_profile(&self, caller: &AuthenticatedUser) -> AppResult<UserResponse> {
        let user = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or_else(|| not_found_error("Usuário não encontrado"))?;

        Ok(UserResponse::from(user))
    }

    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let current = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or_else(|| not_found_error("Usuário não encontrado"))?;

        let cpf_cnpj = sanitize_optional(request.cpf_cnpj.as_deref()).filter(|v| !v.is_empty());

        // Sólo se revisa la unicidad si el CPF/CNPJ cambia
        if let Some(new_cpf) = &cpf_cnpj {
            if current.cpf_cnpj.as_deref() != Some(new_cpf.as_str())
                && self.users.cpf_cnpj_exists(new_cpf).await?
            {
                return Err(conflict_error("CPF/CNPJ já cadastrado"));
            }
        }

        let patch = UserPatch {
            name: sanitize_optional(request.name.as_deref()),
            phone: sanitize_optional(request.phone.as_deref()),
            whatsapp: sanitize_optional(request.whatsapp.as_deref()),
            cpf_cnpj,
            driver_license: sanitize_optional(request.driver_license.as_deref()),
            company_name: sanitize_optional(request.company_name.as_deref()),
        };

        let user = self
            .users
            .update(caller.id, &patch)
            .await?
            .ok_or_else(|| not_found_error("Usuário não encontrado"))?;

        info!("👤 Perfil actualizado: {}", user.email);
        Ok(UserResponse::from(user))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Credenciais inválidas".to_string())
}
