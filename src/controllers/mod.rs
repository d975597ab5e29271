//! Controllers
//!
//! Cada controller recibe la identidad del llamador de forma explícita y
//! trabaja sólo contra los traits de repositorio.

pub mod availability_controller;
pub mod photo_controller;
pub mod user_controller;
pub mod vehicle_controller;

pub use availability_controller::AvailabilityController;
pub use photo_controller::PhotoController;
pub use user_controller::UserController;
pub use vehicle_controller::VehicleController;
