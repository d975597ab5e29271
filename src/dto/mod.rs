//! DTOs de la API
//!
//! Requests validadas y responses serializadas en camelCase.

pub mod availability_dto;
pub mod chat_dto;
pub mod photo_dto;
pub mod user_dto;
pub mod vehicle_dto;
