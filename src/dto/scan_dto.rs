//! DTOs del ingreso de escaneos y heartbeats

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TollReceipt;

pub const UNKNOWN_CHECKPOINT: &str = "Unknown";
pub const UNKNOWN_SCANNER: &str = "Unknown";

/// Cuerpo de `POST /api/toll/rfid-scan`
///
/// Cualquier `toll_amount` enviado por el cliente se ignora: la tarifa se
/// resuelve siempre por checkpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(alias = "rfid_tag")]
    pub rfid: Option<String>,
    pub checkpoint: Option<String>,
    pub scanner_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: Uuid,
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub checkpoint: String,
    pub toll_amount: Decimal,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<TollReceipt> for ScanResponse {
    fn from(receipt: TollReceipt) -> Self {
        Self {
            success: true,
            message: format!("Toll of {} charged", receipt.toll_amount),
            transaction_id: receipt.transaction_id,
            vehicle_id: receipt.vehicle_id,
            license_plate: receipt.license_plate,
            checkpoint: receipt.checkpoint,
            toll_amount: receipt.toll_amount,
            previous_balance: receipt.previous_balance,
            new_balance: receipt.new_balance,
            timestamp: receipt.timestamp,
        }
    }
}

/// Cuerpo de `POST /api/scanner/heartbeat`
#[derive(Debug, Default, Deserialize)]
pub struct HeartbeatRequest {
    pub scanner_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub message: String,
    pub scanner_id: String,
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub store: String,
    pub server_time: DateTime<Utc>,
}
