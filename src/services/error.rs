//! Errores de dominio de los servicios de peaje
//!
//! Cada rechazo lleva los valores necesarios para registrarlo y mostrarlo.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::VehicleStatus;
use crate::repositories::StoreError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TollError {
    #[error("Vehicle not found for RFID tag '{rfid}'")]
    VehicleNotFound { rfid: String },

    #[error("Vehicle {vehicle_id} not found")]
    UnknownVehicle { vehicle_id: Uuid },

    #[error("Owner {owner_id} not found")]
    UnknownOwner { owner_id: Uuid },

    #[error("Vehicle is {status}")]
    VehicleNotActive {
        status: VehicleStatus,
        license_plate: String,
    },

    #[error("Insufficient balance: {balance} < {required}")]
    InsufficientBalance {
        balance: Decimal,
        required: Decimal,
        license_plate: String,
    },

    #[error("Invalid amount {amount}: must be positive, with at most two decimals and within the balance range")]
    InvalidAmount { amount: Decimal },

    #[error("Cannot {action} a vehicle that is {from}")]
    InvalidTransition {
        from: VehicleStatus,
        action: &'static str,
    },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl TollError {
    /// Código estable para logs y respuestas
    pub fn code(&self) -> &'static str {
        match self {
            TollError::VehicleNotFound { .. } | TollError::UnknownVehicle { .. } => "VEHICLE_NOT_FOUND",
            TollError::UnknownOwner { .. } => "OWNER_NOT_FOUND",
            TollError::VehicleNotActive { .. } => "VEHICLE_NOT_ACTIVE",
            TollError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TollError::InvalidAmount { .. } => "INVALID_AMOUNT",
            TollError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TollError::Duplicate(_) => "CONFLICT",
            TollError::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }
}

impl From<StoreError> for TollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => TollError::Duplicate(msg),
            other => TollError::Persistence(other.to_string()),
        }
    }
}

pub type TollResult<T> = Result<T, TollError>;
