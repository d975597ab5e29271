use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::user::{User, UserRole};
use crate::utils::errors::field_error;
use crate::utils::validation::BusinessRules;

// Request de registro
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
    #[validate(length(min = 3, message = "O nome deve ter no mínimo 3 caracteres"))]
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub driver_license: Option<String>,
    pub company_name: Option<String>,
}

impl BusinessRules for RegisterRequest {
    fn validate_rules(&self, errors: &mut ValidationErrors) {
        let has_license = self
            .driver_license
            .as_deref()
            .map(|license| !license.trim().is_empty())
            .unwrap_or(false);

        if self.role == UserRole::Driver && !has_license {
            errors.add("driverLicense", field_error("Motoristas devem informar a CNH"));
        }
    }
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

impl BusinessRules for LoginRequest {}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserResponse,
}

// Actualización parcial del perfil
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "O nome deve ter no mínimo 3 caracteres"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub driver_license: Option<String>,
    pub company_name: Option<String>,
}

impl BusinessRules for UpdateProfileRequest {}

// Response de usuario (nunca incluye el hash de la contraseña)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub driver_license: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            phone: user.phone,
            whatsapp: user.whatsapp,
            cpf_cnpj: user.cpf_cnpj,
            driver_license: user.driver_license,
            company_name: user.company_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: UserRole, driver_license: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: "joao@example.com".to_string(),
            password: "123456".to_string(),
            name: "João Silva".to_string(),
            role,
            phone: None,
            whatsapp: None,
            cpf_cnpj: None,
            driver_license: driver_license.map(str::to_string),
            company_name: None,
        }
    }

    #[test]
    fn test_driver_without_license_fails() {
        let errors = register(UserRole::Driver, None).validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("driverLicense"));

        let blank = register(UserRole::Driver, Some("  ")).validate_all().unwrap_err();
        assert!(blank.field_errors().contains_key("driverLicense"));
    }

    #[test]
    fn test_client_without_license_is_valid() {
        assert!(register(UserRole::Client, None).validate_all().is_ok());
        assert!(register(UserRole::Driver, Some("12345678901")).validate_all().is_ok());
    }

    #[test]
    fn test_shape_and_business_errors_are_reported_together() {
        let mut request = register(UserRole::Driver, None);
        request.password = "123".to_string();
        request.email = "invalido".to_string();

        let errors = request.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("driverLicense"));
    }

    #[test]
    fn test_register_accepts_camel_case_payload() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "maria@example.com",
            "password": "123456",
            "name": "Maria Santos",
            "role": "DRIVER",
            "driverLicense": "23456789012",
            "cpfCnpj": "234.567.890-11"
        }))
        .unwrap();
        assert_eq!(request.driver_license.as_deref(), Some("23456789012"));
        assert_eq!(request.cpf_cnpj.as_deref(), Some("234.567.890-11"));
    }
}
