//! Modelo de User
//!
//! Mapea la tabla `users`. Un usuario es motorista (DRIVER), cliente
//! (CLIENT) o administrador (ADMIN).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Driver,
    Client,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Driver => "DRIVER",
            UserRole::Client => "CLIENT",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRIVER" => Some(UserRole::Driver),
            "CLIENT" => Some(UserRole::Client),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// User principal - incluye el hash de la contraseña, nunca se serializa hacia fuera
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
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

/// Datos ya validados y sanitizados para insertar un usuario
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub driver_license: Option<String>,
    pub company_name: Option<String>,
}

impl NewUser {
    pub fn into_user(self, id: Uuid, now: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            role: self.role,
            phone: self.phone,
            whatsapp: self.whatsapp,
            cpf_cnpj: self.cpf_cnpj,
            driver_license: self.driver_license,
            company_name: self.company_name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cambios parciales de perfil. `None` deja el campo como está.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub driver_license: Option<String>,
    pub company_name: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(whatsapp) = &self.whatsapp {
            user.whatsapp = Some(whatsapp.clone());
        }
        if let Some(cpf_cnpj) = &self.cpf_cnpj {
            user.cpf_cnpj = Some(cpf_cnpj.clone());
        }
        if let Some(driver_license) = &self.driver_license {
            user.driver_license = Some(driver_license.clone());
        }
        if let Some(company_name) = &self.company_name {
            user.company_name = Some(company_name.clone());
        }
    }
}

/// Resumen público de un usuario (participantes de chat, dueño de vehículo)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub company_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
            company_name: user.company_name.clone(),
        }
    }
}

/// Contacto del motorista que se muestra junto a vehículos y disponibilidades
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverContact {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_license: Option<String>,
}

impl DriverContact {
    pub fn from_user(user: &User, include_license: bool) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            whatsapp: user.whatsapp.clone(),
            company_name: user.company_name.clone(),
            driver_license: if include_license {
                user.driver_license.clone()
            } else {
                None
            },
        }
    }
}
