use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Payment, TollTransaction, Vehicle, VehicleStatus};
use crate::utils::validation::validate_rfid_tag;

// Request para provisionar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub owner_id: Uuid,
    #[validate(custom = "validate_rfid_tag")]
    pub rfid: String,
    #[validate(length(min = 1, max = 20))]
    pub license_plate: String,
    #[validate(length(max = 40))]
    pub vehicle_type: Option<String>,
    pub initial_balance: Option<Decimal>,
}

// Request de recarga
#[derive(Debug, Default, Deserialize)]
pub struct RechargeRequest {
    pub amount: Option<Decimal>,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub rfid: String,
    pub license_plate: String,
    pub vehicle_type: Option<String>,
    pub balance: Decimal,
    pub status: VehicleStatus,
    pub suspended_at: Option<DateTime<Utc>>,
    pub reactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            owner_id: vehicle.owner_id,
            rfid: vehicle.rfid,
            license_plate: vehicle.license_plate,
            vehicle_type: vehicle.vehicle_type,
            balance: vehicle.balance,
            status: vehicle.status,
            suspended_at: vehicle.suspended_at,
            reactivated_at: vehicle.reactivated_at,
            created_at: vehicle.created_at,
        }
    }
}

// Response de suspend/reactivate
#[derive(Debug, Serialize)]
pub struct LifecycleResponse {
    pub success: bool,
    pub message: String,
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub status: VehicleStatus,
    pub suspended_at: Option<DateTime<Utc>>,
    pub reactivated_at: Option<DateTime<Utc>>,
}

impl LifecycleResponse {
    pub fn new(vehicle: Vehicle, message: String) -> Self {
        Self {
            success: true,
            message,
            vehicle_id: vehicle.id,
            license_plate: vehicle.license_plate,
            status: vehicle.status,
            suspended_at: vehicle.suspended_at,
            reactivated_at: vehicle.reactivated_at,
        }
    }
}

// Response de recarga
#[derive(Debug, Serialize)]
pub struct RechargeResponse {
    pub success: bool,
    pub message: String,
    pub payment_id: Uuid,
    pub vehicle_id: Uuid,
    pub amount_added: Decimal,
    pub new_balance: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Payment> for RechargeResponse {
    fn from(payment: Payment) -> Self {
        Self {
            success: true,
            message: format!("Added {} to balance", payment.amount),
            payment_id: payment.id,
            vehicle_id: payment.vehicle_id,
            amount_added: payment.amount,
            new_balance: payment.balance_after,
            timestamp: payment.created_at,
        }
    }
}

// Historial de un vehículo o propietario
#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for HistoryResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

pub type TollHistory = HistoryResponse<TollTransaction>;
pub type PaymentHistory = HistoryResponse<Payment>;
