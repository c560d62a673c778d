//! Eventos de escaneo RFID
//!
//! Un `ScanEvent` ya validado es la única entrada del motor de peajes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Origen autenticado de un escaneo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOrigin {
    /// Lector en carretera autenticado con el token compartido
    Scanner,
    /// Entrada manual de un administrador (JWT con rol admin)
    Manual { operator: String },
}

/// Evento de escaneo listo para procesar
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub rfid_tag: String,
    pub checkpoint_id: String,
    pub toll_amount: Decimal,
    pub scanner_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Resultado de un peaje cobrado
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TollReceipt {
    pub transaction_id: Uuid,
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub checkpoint: String,
    pub toll_amount: Decimal,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub timestamp: DateTime<Utc>,
}
