//! Services module
//!
//! Este módulo contiene la lógica de negocio del sistema de peajes: el
//! directorio de vehículos, el motor de cobro, el ciclo de vida y las recargas.
//! Todos los servicios comparten el mismo `VehicleLocks` para serializar las
//! mutaciones de un mismo vehículo.

pub mod account_service;
pub mod error;
pub mod lifecycle_service;
pub mod recharge_service;
pub mod toll_service;
pub mod vehicle_directory;
pub mod vehicle_locks;

pub use account_service::AccountService;
pub use error::{TollError, TollResult};
pub use lifecycle_service::LifecycleService;
pub use recharge_service::RechargeService;
pub use toll_service::TollService;
pub use vehicle_directory::VehicleDirectory;
pub use vehicle_locks::VehicleLocks;
