//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL del sistema de peajes.

pub mod money;
pub mod owner;
pub mod scan;
pub mod transaction;
pub mod vehicle;

pub use owner::{NewOwner, Owner};
pub use scan::{ScanEvent, ScanOrigin, TollReceipt};
pub use transaction::{
    NewPayment, NewTollTransaction, Payment, RejectionReason, TollTransaction, TransactionStatus,
};
pub use vehicle::{NewVehicle, Vehicle, VehicleFields, VehicleStatus};
