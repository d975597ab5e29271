//! Repositorios
//!
//! Cada entidad expone un trait de repositorio. Hay dos implementaciones:
//! PostgreSQL (`Pg*Repository`, producción) y `MemoryStore` (desarrollo local
//! y tests). Los controllers sólo conocen los traits.

pub mod availability_repository;
pub mod chat_repository;
pub mod memory;
pub mod photo_repository;
pub mod user_repository;
pub mod vehicle_repository;

use std::sync::Arc;

use sqlx::PgPool;

pub use availability_repository::{AvailabilityRepository, PgAvailabilityRepository};
pub use chat_repository::{ChatRepository, PgChatRepository};
pub use memory::MemoryStore;
pub use photo_repository::{PgPhotoRepository, PhotoRepository};
pub use user_repository::{PgUserRepository, UserRepository};
pub use vehicle_repository::{PgVehicleRepository, VehicleRepository};

/// Conjunto de repositorios que comparten los controllers
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub availabilities: Arc<dyn AvailabilityRepository>,
    pub chats: Arc<dyn ChatRepository>,
}

impl Repositories {
    /// Repositorios respaldados por PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            photos: Arc::new(PgPhotoRepository::new(pool.clone())),
            availabilities: Arc::new(PgAvailabilityRepository::new(pool.clone())),
            chats: Arc::new(PgChatRepository::new(pool)),
        }
    }

    /// Repositorios en memoria; todos comparten el mismo almacén
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            vehicles: Arc::new(store.clone()),
            photos: Arc::new(store.clone()),
            availabilities: Arc::new(store.clone()),
            chats: Arc::new(store),
        }
    }
}
