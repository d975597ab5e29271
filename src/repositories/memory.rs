//! Almacén en memoria
//!
//! Implementa todos los traits de repositorio sobre un único estado protegido
//! por `RwLock`. Reproduce las restricciones de la base de datos (unicidad de
//! email, CPF/CNPJ, placa y par de chat; borrado en cascada; una sola foto
//! primaria) para que los tests ejerciten el mismo comportamiento.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::availability::{
    AvailabilityFilter, AvailabilityListing, AvailabilityOrder, AvailabilityPatch, NewAvailability,
    ReturnAvailability, VehicleSummary, Window,
};
use crate::models::chat::{canonical_pair, Chat, ChatOverview, Message, MessageSender, MessageWithSender};
use crate::models::user::{DriverContact, NewUser, User, UserPatch, UserSummary};
use crate::models::vehicle::{sort_primary_first, NewVehicle, Vehicle, VehiclePatch, VehiclePhoto};
use crate::repositories::{
    AvailabilityRepository, ChatRepository, PhotoRepository, UserRepository, VehicleRepository,
};
use crate::utils::errors::{conflict_error, AppResult};

#[derive(Default)]
struct MemoryData {
    users: HashMap<Uuid, User>,
    vehicles: HashMap<Uuid, Vehicle>,
    photos: HashMap<Uuid, VehiclePhoto>,
    availabilities: HashMap<Uuid, ReturnAvailability>,
    chats: HashMap<Uuid, Chat>,
    messages: Vec<Message>,
}

impl MemoryData {
    fn primary_url(&self, vehicle_id: Uuid) -> Option<String> {
        self.photos
            .values()
            .find(|p| p.vehicle_id == vehicle_id && p.is_primary)
            .map(|p| p.url.clone())
    }

    fn clear_primary(&mut self, vehicle_id: Uuid) {
        for photo in self.photos.values_mut() {
            if photo.vehicle_id == vehicle_id {
                photo.is_primary = false;
            }
        }
    }

    fn listing(&self, availability: &ReturnAvailability) -> Option<AvailabilityListing> {
        let vehicle = self.vehicles.get(&availability.vehicle_id)?;
        let user = self.users.get(&availability.user_id)?;

        Some(AvailabilityListing {
            availability: availability.clone(),
            vehicle: VehicleSummary::from_vehicle(vehicle, self.primary_url(vehicle.id)),
            user: DriverContact::from_user(user, false),
        })
    }

    fn matching(&self, filter: &AvailabilityFilter) -> Vec<&ReturnAvailability> {
        self.availabilities
            .values()
            .filter(|a| {
                self.vehicles
                    .get(&a.vehicle_id)
                    .map(|v| filter.matches(a, v))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn summary(&self, user_id: Uuid) -> Option<UserSummary> {
        self.users.get(&user_id).map(UserSummary::from)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut data = self.data.write().await;

        if data.users.values().any(|u| u.email == user.email) {
            return Err(conflict_error("Email já cadastrado"));
        }
        if let Some(cpf_cnpj) = &user.cpf_cnpj {
            if data.users.values().any(|u| u.cpf_cnpj.as_ref() == Some(cpf_cnpj)) {
                return Err(conflict_error("CPF/CNPJ já cadastrado"));
            }
        }

        let user = user.into_user(Uuid::new_v4(), Utc::now());
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data.users.values().any(|u| u.email == email))
    }

    async fn cpf_cnpj_exists(&self, cpf_cnpj: &str) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .any(|u| u.cpf_cnpj.as_deref() == Some(cpf_cnpj)))
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> AppResult<Option<User>> {
        let mut data = self.data.write().await;

        if let Some(cpf_cnpj) = &patch.cpf_cnpj {
            let taken = data
                .users
                .values()
                .any(|u| u.id != id && u.cpf_cnpj.as_ref() == Some(cpf_cnpj));
            if taken {
                return Err(conflict_error("CPF/CNPJ já cadastrado"));
            }
        }

        Ok(data.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn create(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut data = self.data.write().await;

        if data.vehicles.values().any(|v| v.plate == vehicle.plate) {
            return Err(conflict_error("Placa já cadastrada"));
        }

        let vehicle = vehicle.into_vehicle(Uuid::new_v4(), Utc::now());
        data.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.data.read().await.vehicles.get(&id).cloned())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let data = self.data.read().await;
        let mut vehicles: Vec<Vehicle> = data
            .vehicles
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles)
    }

    async fn plate_exists(&self, plate: &str) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data.vehicles.values().any(|v| v.plate == plate))
    }

    async fn update(&self, id: Uuid, patch: &VehiclePatch) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;

        if let Some(plate) = &patch.plate {
            if data.vehicles.values().any(|v| v.id != id && &v.plate == plate) {
                return Err(conflict_error("Placa já cadastrada"));
            }
        }

        Ok(data.vehicles.get_mut(&id).map(|vehicle| {
            patch.apply(vehicle);
            vehicle.updated_at = Utc::now();
            vehicle.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.write().await;

        if data.vehicles.remove(&id).is_none() {
            return Ok(false);
        }
        data.photos.retain(|_, p| p.vehicle_id != id);
        data.availabilities.retain(|_, a| a.vehicle_id != id);
        Ok(true)
    }

    async fn count_availabilities(&self, vehicle_id: Uuid) -> AppResult<i64> {
        let data = self.data.read().await;
        Ok(data
            .availabilities
            .values()
            .filter(|a| a.vehicle_id == vehicle_id)
            .count() as i64)
    }
}

#[async_trait]
impl PhotoRepository for MemoryStore {
    async fn create(&self, vehicle_id: Uuid, url: String, is_primary: bool) -> AppResult<VehiclePhoto> {
        let mut data = self.data.write().await;

        if is_primary {
            data.clear_primary(vehicle_id);
        }

        let photo = VehiclePhoto {
            id: Uuid::new_v4(),
            vehicle_id,
            url,
            is_primary,
            created_at: Utc::now(),
        };
        data.photos.insert(photo.id, photo.clone());
        Ok(photo)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        Ok(self.data.read().await.photos.get(&id).cloned())
    }

    async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<VehiclePhoto>> {
        let data = self.data.read().await;
        let mut photos: Vec<VehiclePhoto> = data
            .photos
            .values()
            .filter(|p| p.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        sort_primary_first(&mut photos);
        Ok(photos)
    }

    async fn primary_url(&self, vehicle_id: Uuid) -> AppResult<Option<String>> {
        Ok(self.data.read().await.primary_url(vehicle_id))
    }

    async fn set_primary(&self, id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        let mut data = self.data.write().await;

        let Some(vehicle_id) = data.photos.get(&id).map(|p| p.vehicle_id) else {
            return Ok(None);
        };
        data.clear_primary(vehicle_id);

        Ok(data.photos.get_mut(&id).map(|photo| {
            photo.is_primary = true;
            photo.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.photos.remove(&id).is_some())
    }
}

#[async_trait]
impl AvailabilityRepository for MemoryStore {
    async fn create(&self, availability: NewAvailability) -> AppResult<ReturnAvailability> {
        let availability = availability.into_availability(Uuid::new_v4(), Utc::now());
        self.data
            .write()
            .await
            .availabilities
            .insert(availability.id, availability.clone());
        Ok(availability)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ReturnAvailability>> {
        Ok(self.data.read().await.availabilities.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &AvailabilityPatch) -> AppResult<Option<ReturnAvailability>> {
        let mut data = self.data.write().await;
        Ok(data.availabilities.get_mut(&id).map(|availability| {
            patch.apply(availability);
            availability.updated_at = Utc::now();
            availability.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.availabilities.remove(&id).is_some())
    }

    async fn list(
        &self,
        filter: &AvailabilityFilter,
        order: AvailabilityOrder,
        window: Option<Window>,
    ) -> AppResult<Vec<AvailabilityListing>> {
        let data = self.data.read().await;
        let mut matching = data.matching(filter);

        match order {
            AvailabilityOrder::CreatedDesc => {
                matching.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            AvailabilityOrder::AvailableDateAsc => {
                matching.sort_by(|a, b| a.available_date.cmp(&b.available_date))
            }
        }

        let (offset, limit) = match window {
            Some(w) => (w.offset.max(0) as usize, w.limit.max(0) as usize),
            None => (0, usize::MAX),
        };

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|a| data.listing(a))
            .collect())
    }

    async fn count(&self, filter: &AvailabilityFilter) -> AppResult<i64> {
        Ok(self.data.read().await.matching(filter).len() as i64)
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Chat>> {
        let key = canonical_pair(a, b);
        let data = self.data.read().await;
        Ok(data.chats.values().find(|c| c.pair_key() == key).cloned())
    }

    async fn create(&self, participant1_id: Uuid, participant2_id: Uuid) -> AppResult<Chat> {
        let key = canonical_pair(participant1_id, participant2_id);
        let mut data = self.data.write().await;

        if data.chats.values().any(|c| c.pair_key() == key) {
            return Err(conflict_error("Chat já existe"));
        }

        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            participant1_id,
            participant2_id,
            created_at: now,
            updated_at: now,
        };
        data.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Chat>> {
        Ok(self.data.read().await.chats.get(&id).cloned())
    }

    async fn list_overviews(&self, user_id: Uuid) -> AppResult<Vec<ChatOverview>> {
        let data = self.data.read().await;

        let mut chats: Vec<&Chat> = data
            .chats
            .values()
            .filter(|c| c.has_participant(user_id))
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(chats
            .into_iter()
            .filter_map(|chat| {
                let messages: Vec<&Message> =
                    data.messages.iter().filter(|m| m.chat_id == chat.id).collect();
                let last_message = messages.iter().max_by_key(|m| m.created_at).map(|m| (*m).clone());
                let unread_count = messages
                    .iter()
                    .filter(|m| m.sender_id != user_id && !m.read)
                    .count() as i64;

                Some(ChatOverview {
                    participant1: data.summary(chat.participant1_id)?,
                    participant2: data.summary(chat.participant2_id)?,
                    chat: chat.clone(),
                    last_message,
                    unread_count,
                })
            })
            .collect())
    }

    async fn add_message(&self, chat_id: Uuid, sender_id: Uuid, content: String) -> AppResult<Message> {
        let mut data = self.data.write().await;
        let now = Utc::now();

        let message = Message {
            id: Uuid::new_v4(),
            chat_id,
            sender_id,
            content,
            read: false,
            created_at: now,
        };
        data.messages.push(message.clone());
        if let Some(chat) = data.chats.get_mut(&chat_id) {
            chat.updated_at = now;
        }
        Ok(message)
    }

    async fn list_messages(&self, chat_id: Uuid) -> AppResult<Vec<MessageWithSender>> {
        let data = self.data.read().await;

        let mut messages: Vec<MessageWithSender> = data
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| MessageWithSender {
                sender: MessageSender {
                    id: m.sender_id,
                    name: data
                        .users
                        .get(&m.sender_id)
                        .map(|u| u.name.clone())
                        .unwrap_or_default(),
                },
                message: m.clone(),
            })
            .collect();
        // sort_by es estable: mismo instante conserva el orden de inserción
        messages.sort_by(|a, b| a.message.created_at.cmp(&b.message.created_at));
        Ok(messages)
    }

    async fn mark_read(&self, chat_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for message in data.messages.iter_mut() {
            if message.chat_id == chat_id && message.sender_id != reader_id && !message.read {
                message.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use crate::models::vehicle::VehicleType;
    use rust_decimal::Decimal;

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Teste".to_string(),
            role,
            phone: None,
            whatsapp: None,
            cpf_cnpj: None,
            driver_license: Some("12345678900".to_string()),
            company_name: None,
        }
    }

    fn new_vehicle(user_id: Uuid, plate: &str) -> NewVehicle {
        NewVehicle {
            user_id,
            vehicle_type: VehicleType::TruckLarge,
            brand: "Scania".to_string(),
            model: "R 450".to_string(),
            year: 2020,
            plate: plate.to_string(),
            capacity: Decimal::from(25),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@b.com", UserRole::Client))
            .await
            .unwrap();
        let err = UserRepository::create(&store, new_user("a@b.com", UserRole::Driver))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::utils::errors::AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_only_one_primary_photo_per_vehicle() {
        let store = MemoryStore::new();
        let vehicle_id = Uuid::new_v4();

        let first = PhotoRepository::create(&store, vehicle_id, "/uploads/a.jpg".into(), true)
            .await
            .unwrap();
        let second = PhotoRepository::create(&store, vehicle_id, "/uploads/b.jpg".into(), true)
            .await
            .unwrap();

        let photos = store.list_by_vehicle(vehicle_id).await.unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos.iter().filter(|p| p.is_primary).count(), 1);
        assert_eq!(photos[0].id, second.id);

        store.set_primary(first.id).await.unwrap();
        let photos = store.list_by_vehicle(vehicle_id).await.unwrap();
        assert_eq!(photos[0].id, first.id);
        assert_eq!(photos.iter().filter(|p| p.is_primary).count(), 1);
    }

    #[tokio::test]
    async fn test_vehicle_delete_cascades() {
        let store = MemoryStore::new();
        let owner = UserRepository::create(&store, new_user("d@b.com", UserRole::Driver))
            .await
            .unwrap();
        let vehicle = VehicleRepository::create(&store, new_vehicle(owner.id, "ABC1D23"))
            .await
            .unwrap();
        PhotoRepository::create(&store, vehicle.id, "/uploads/a.jpg".into(), false)
            .await
            .unwrap();

        assert!(VehicleRepository::delete(&store, vehicle.id).await.unwrap());
        assert!(store.list_by_vehicle(vehicle.id).await.unwrap().is_empty());
        assert!(!VehicleRepository::delete(&store, vehicle.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_chat_pair_is_unique_regardless_of_order() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        ChatRepository::create(&store, a, b).await.unwrap();
        assert!(ChatRepository::create(&store, b, a).await.is_err());
        assert!(store.find_between(b, a).await.unwrap().is_some());
    }
}
