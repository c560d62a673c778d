//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle con saldo prepago y estado del ciclo de vida.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Suspended,
    Inactive,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Suspended => "suspended",
            VehicleStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle principal - mapea a la tabla vehicles
///
/// `version` se incrementa en cada escritura y es la clave de las
/// actualizaciones condicionales (compare-and-swap) del Balance Store.
/// `suspended_at` y `reactivated_at` nunca están ambos presentes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub rfid: String,
    pub license_plate: String,
    pub vehicle_type: Option<String>,
    pub balance: Decimal,
    pub status: VehicleStatus,
    pub suspended_at: Option<DateTime<Utc>>,
    pub reactivated_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }
}

/// Datos para provisionar un vehículo nuevo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub owner_id: Uuid,
    pub rfid: String,
    pub license_plate: String,
    pub vehicle_type: Option<String>,
    pub initial_balance: Decimal,
}

/// Campos mutables de un vehículo (el "field map" de updateVehicleFields).
///
/// `None` deja el campo intacto; `Some(None)` en los timestamps lo pone a NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFields {
    pub balance: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub suspended_at: Option<Option<DateTime<Utc>>>,
    pub reactivated_at: Option<Option<DateTime<Utc>>>,
}

impl VehicleFields {
    /// Aplica los cambios sobre una copia del vehículo y avanza la versión
    pub fn apply_to(&self, vehicle: &Vehicle) -> Vehicle {
        let mut updated = vehicle.clone();
        if let Some(balance) = self.balance {
            updated.balance = balance;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(suspended_at) = self.suspended_at {
            updated.suspended_at = suspended_at;
        }
        if let Some(reactivated_at) = self.reactivated_at {
            updated.reactivated_at = reactivated_at;
        }
        updated.version = vehicle.version + 1;
        updated
    }
}
