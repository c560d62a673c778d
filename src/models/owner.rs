//! Modelo de Owner
//!
//! Propietario de uno o más vehículos. Solo aporta `owner_id` para
//! atribuir transacciones y pagos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Owner principal - mapea exactamente a la tabla owners
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Datos para registrar un owner nuevo
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
