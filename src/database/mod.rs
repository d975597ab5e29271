//! Módulo de base de datos
//!
//! Conexión y migraciones de PostgreSQL, y carga de datos de demostración.

pub mod connection;
pub mod seed;

pub use connection::connect_and_migrate;
pub use seed::seed_demo_data;
