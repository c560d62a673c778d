//! Controllers
//!
//! Capa entre los handlers de Axum y los servicios: validan DTOs y
//! convierten resultados de dominio en respuestas.

pub mod owner_controller;
pub mod toll_controller;
pub mod vehicle_controller;

pub use owner_controller::OwnerController;
pub use toll_controller::{ScannerController, TollController};
pub use vehicle_controller::VehicleController;
