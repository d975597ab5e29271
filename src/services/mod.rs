//! Services module
//!
//! Lógica de negocio que cruza varios repositorios: búsqueda pública,
//! mensajería y almacenamiento de fotos.

pub mod messaging_service;
pub mod photo_storage;
pub mod search_service;

pub use messaging_service::{ChatOpening, MessagingService};
pub use photo_storage::{LocalPhotoStorage, PhotoStorage};
pub use search_service::SearchService;
