//! Datos de demostración
//!
//! Carga motoristas, clientes, un admin, vehículos con fotos,
//! disponibilidades y algunas conversaciones. Pasa por los repositorios, así
//! que sirve para ambos backends. Si el admin ya existe no hace nada.

use std::str::FromStr;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::availability::{AvailabilityPatch, AvailabilityStatus, NewAvailability};
use crate::models::user::{NewUser, UserRole};
use crate::models::vehicle::{NewVehicle, VehicleType};
use crate::repositories::Repositories;
use crate::utils::errors::{AppError, AppResult};

pub const DEMO_PASSWORD: &str = "123456";
pub const ADMIN_EMAIL: &str = "admin@retorno.com";

struct DemoUser {
    email: &'static str,
    name: &'static str,
    role: UserRole,
    phone: Option<&'static str>,
    whatsapp: Option<&'static str>,
    cpf_cnpj: &'static str,
    driver_license: Option<&'static str>,
    company_name: Option<&'static str>,
}

const USERS: &[DemoUser] = &[
    DemoUser {
        email: "joao.silva@example.com",
        name: "João Silva",
        role: UserRole::Driver,
        phone: Some("(11) 98765-4321"),
        whatsapp: Some("5511987654321"),
        cpf_cnpj: "123.456.789-00",
        driver_license: Some("12345678901"),
        company_name: Some("Transportes Silva Ltda"),
    },
    DemoUser {
        email: "maria.santos@example.com",
        name: "Maria Santos",
        role: UserRole::Driver,
        phone: Some("(21) 99876-5432"),
        whatsapp: Some("5521998765432"),
        cpf_cnpj: "234.567.890-11",
        driver_license: Some("23456789012"),
        company_name: Some("M. Santos Transportes"),
    },
    DemoUser {
        email: "carlos.oliveira@example.com",
        name: "Carlos Oliveira",
        role: UserRole::Driver,
        phone: Some("(41) 97765-4321"),
        whatsapp: Some("5541977654321"),
        cpf_cnpj: "345.678.901-22",
        driver_license: Some("34567890123"),
        company_name: None,
    },
    DemoUser {
        email: "ana.costa@example.com",
        name: "Ana Costa",
        role: UserRole::Client,
        phone: Some("(11) 96543-2109"),
        whatsapp: Some("5511965432109"),
        cpf_cnpj: "456.789.012-33",
        driver_license: None,
        company_name: None,
    },
    DemoUser {
        email: "pedro.martins@example.com",
        name: "Pedro Martins",
        role: UserRole::Client,
        phone: Some("(19) 95432-1098"),
        whatsapp: Some("5519954321098"),
        cpf_cnpj: "12.345.678/0001-90",
        driver_license: None,
        company_name: None,
    },
    DemoUser {
        email: "juliana.ferreira@example.com",
        name: "Juliana Ferreira",
        role: UserRole::Client,
        phone: Some("(21) 94321-0987"),
        whatsapp: None,
        cpf_cnpj: "23.456.789/0001-01",
        driver_license: None,
        company_name: None,
    },
    DemoUser {
        email: ADMIN_EMAIL,
        name: "Administrador",
        role: UserRole::Admin,
        phone: None,
        whatsapp: None,
        cpf_cnpj: "000.000.000-00",
        driver_license: None,
        company_name: None,
    },
];

struct DemoVehicle {
    owner: usize,
    vehicle_type: VehicleType,
    brand: &'static str,
    model: &'static str,
    year: i32,
    plate: &'static str,
    capacity: &'static str,
    description: &'static str,
    photos: &'static [&'static str],
}

const VEHICLES: &[DemoVehicle] = &[
    DemoVehicle {
        owner: 0,
        vehicle_type: VehicleType::TruckLarge,
        brand: "Scania",
        model: "R 450",
        year: 2020,
        plate: "ABC1D23",
        capacity: "25",
        description: "Caminhão truck em excelente estado, com baú refrigerado",
        photos: &["/uploads/vehicles/scania-r450-1.jpg", "/uploads/vehicles/scania-r450-2.jpg"],
    },
    DemoVehicle {
        owner: 0,
        vehicle_type: VehicleType::TruckSemi,
        brand: "Volvo",
        model: "FH 540",
        year: 2019,
        plate: "DEF4G56",
        capacity: "40",
        description: "Carreta com carroceria aberta para cargas diversas",
        photos: &["/uploads/vehicles/volvo-fh540-1.jpg"],
    },
    DemoVehicle {
        owner: 1,
        vehicle_type: VehicleType::TruckMedium,
        brand: "Mercedes-Benz",
        model: "Atego 1719",
        year: 2021,
        plate: "GHI7J89",
        capacity: "12",
        description: "Caminhão toco ideal para cargas urbanas",
        photos: &["/uploads/vehicles/mercedes-atego-1.jpg"],
    },
    DemoVehicle {
        owner: 2,
        vehicle_type: VehicleType::Van,
        brand: "Iveco",
        model: "Daily",
        year: 2022,
        plate: "JKL0M12",
        capacity: "3.5",
        description: "Van baú para pequenas entregas e cargas leves",
        photos: &["/uploads/vehicles/iveco-daily-1.jpg"],
    },
    DemoVehicle {
        owner: 2,
        vehicle_type: VehicleType::TruckLarge,
        brand: "DAF",
        model: "XF",
        year: 2018,
        plate: "MNO3P45",
        capacity: "28",
        description: "Caminhão truck com rastreamento e seguro total",
        photos: &["/uploads/vehicles/daf-xf-1.jpg"],
    },
];

struct DemoAvailability {
    vehicle: usize,
    origin: (&'static str, &'static str),
    destination: (&'static str, &'static str),
    days_ahead: i64,
    flexible_dates: bool,
    price: &'static str,
    capacity: &'static str,
    description: &'static str,
    observations: Option<&'static str>,
    status: AvailabilityStatus,
}

const AVAILABILITIES: &[DemoAvailability] = &[
    DemoAvailability {
        vehicle: 0,
        origin: ("Rio de Janeiro", "RJ"),
        destination: ("São Paulo", "SP"),
        days_ahead: 1,
        flexible_dates: true,
        price: "2000",
        capacity: "25",
        description: "Retorno de entrega, capacidade total disponível",
        observations: Some("Aceito cargas frigoríficas"),
        status: AvailabilityStatus::Active,
    },
    DemoAvailability {
        vehicle: 1,
        origin: ("Belo Horizonte", "MG"),
        destination: ("Curitiba", "PR"),
        days_ahead: 7,
        flexible_dates: false,
        price: "3500",
        capacity: "40",
        description: "Viagem programada, espaço completo disponível",
        observations: None,
        status: AvailabilityStatus::Active,
    },
    DemoAvailability {
        vehicle: 2,
        origin: ("Campinas", "SP"),
        destination: ("Rio de Janeiro", "RJ"),
        days_ahead: 1,
        flexible_dates: true,
        price: "1500",
        capacity: "12",
        description: "Retorno após entrega matinal",
        observations: Some("Saída prevista para tarde"),
        status: AvailabilityStatus::Active,
    },
    DemoAvailability {
        vehicle: 3,
        origin: ("São Paulo", "SP"),
        destination: ("Santos", "SP"),
        days_ahead: 1,
        flexible_dates: true,
        price: "500",
        capacity: "3.5",
        description: "Retorno diário para o porto",
        observations: None,
        status: AvailabilityStatus::Active,
    },
    DemoAvailability {
        vehicle: 4,
        origin: ("Curitiba", "PR"),
        destination: ("Florianópolis", "SC"),
        days_ahead: 14,
        flexible_dates: false,
        price: "2800",
        capacity: "28",
        description: "Viagem programada com data fixa",
        observations: Some("Documentação completa necessária"),
        status: AvailabilityStatus::Active,
    },
    DemoAvailability {
        vehicle: 2,
        origin: ("Porto Alegre", "RS"),
        destination: ("Curitiba", "PR"),
        days_ahead: 0,
        flexible_dates: false,
        price: "2200",
        capacity: "12",
        description: "Viagem já realizada",
        observations: None,
        status: AvailabilityStatus::Completed,
    },
];

/// (cliente, motorista, mensajes en orden: (remitente es el cliente?, texto))
const CONVERSATIONS: &[(usize, usize, &[(bool, &str)])] = &[
    (
        3,
        0,
        &[
            (true, "Olá! Vi sua disponibilidade Rio-SP. Ainda tem espaço?"),
            (false, "Olá Ana! Sim, tenho capacidade total disponível."),
        ],
    ),
    (
        4,
        1,
        &[(true, "Bom dia! Qual o valor para 8 toneladas até o Rio?")],
    ),
    (
        5,
        2,
        &[
            (true, "Olá! Você faz entregas em Santos?"),
            (false, "Sim! Faço viagens diárias SP-Santos. Como posso ajudar?"),
        ],
    ),
];

fn decimal(value: &str) -> AppResult<Decimal> {
    Decimal::from_str(value).map_err(|e| AppError::Internal(format!("Decimal inválido en seed: {}", e)))
}

/// Cargar los datos de demostración si todavía no existen
pub async fn seed_demo_data(repos: &Repositories, bcrypt_cost: u32) -> AppResult<()> {
    if repos.users.email_exists(ADMIN_EMAIL).await? {
        info!("🌱 Datos de demostración ya cargados, se omite el seed");
        return Ok(());
    }

    info!("🌱 Cargando datos de demostración...");
    let password_hash =
        bcrypt::hash(DEMO_PASSWORD, bcrypt_cost).map_err(|e| AppError::Hash(e.to_string()))?;

    let mut user_ids: Vec<Uuid> = Vec::with_capacity(USERS.len());
    for demo in USERS {
        let user = repos
            .users
            .create(NewUser {
                email: demo.email.to_string(),
                password_hash: password_hash.clone(),
                name: demo.name.to_string(),
                role: demo.role,
                phone: demo.phone.map(str::to_string),
                whatsapp: demo.whatsapp.map(str::to_string),
                cpf_cnpj: Some(demo.cpf_cnpj.to_string()),
                driver_license: demo.driver_license.map(str::to_string),
                company_name: demo.company_name.map(str::to_string),
            })
            .await?;
        user_ids.push(user.id);
    }

    let mut vehicle_ids: Vec<(Uuid, Uuid)> = Vec::with_capacity(VEHICLES.len());
    for demo in VEHICLES {
        let owner_id = user_ids[demo.owner];
        let vehicle = repos
            .vehicles
            .create(NewVehicle {
                user_id: owner_id,
                vehicle_type: demo.vehicle_type,
                brand: demo.brand.to_string(),
                model: demo.model.to_string(),
                year: demo.year,
                plate: demo.plate.to_string(),
                capacity: decimal(demo.capacity)?,
                description: Some(demo.description.to_string()),
            })
            .await?;

        for (index, url) in demo.photos.iter().enumerate() {
            repos.photos.create(vehicle.id, url.to_string(), index == 0).await?;
        }
        vehicle_ids.push((vehicle.id, owner_id));
    }

    let today = Utc::now();
    for demo in AVAILABILITIES {
        let (vehicle_id, owner_id) = vehicle_ids[demo.vehicle];
        let availability = repos
            .availabilities
            .create(NewAvailability {
                user_id: owner_id,
                vehicle_id,
                origin_city: demo.origin.0.to_string(),
                origin_state: demo.origin.1.to_string(),
                destination_city: demo.destination.0.to_string(),
                destination_state: demo.destination.1.to_string(),
                available_date: today + Duration::days(demo.days_ahead),
                flexible_dates: demo.flexible_dates,
                available_capacity: decimal(demo.capacity)?,
                price_estimate: Some(decimal(demo.price)?),
                description: Some(demo.description.to_string()),
                observations: demo.observations.map(str::to_string),
            })
            .await?;

        if demo.status != AvailabilityStatus::Active {
            let patch = AvailabilityPatch {
                status: Some(demo.status),
                ..Default::default()
            };
            repos.availabilities.update(availability.id, &patch).await?;
        }
    }

    for (client, driver, messages) in CONVERSATIONS {
        let client_id = user_ids[*client];
        let driver_id = user_ids[*driver];
        let chat = repos.chats.create(client_id, driver_id).await?;

        for (from_client, content) in messages.iter() {
            let sender = if *from_client { client_id } else { driver_id };
            repos.chats.add_message(chat.id, sender, content.to_string()).await?;
        }
    }

    info!(
        "✅ Seed concluido: {} usuarios, {} vehículos, {} disponibilidades, {} conversaciones",
        USERS.len(),
        VEHICLES.len(),
        AVAILABILITIES.len(),
        CONVERSATIONS.len()
    );
    info!("🔑 Contraseña de todos los usuarios de demostración: {}", DEMO_PASSWORD);
    Ok(())
}
