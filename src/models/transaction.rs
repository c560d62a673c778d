//! Registros inmutables de peajes y recargas
//!
//! `TollTransaction` y `Payment` son append-only: se crean una vez y nunca
//! se modifican.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Motivo de rechazo registrado en una transacción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InsufficientBalance,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::InsufficientBalance => "insufficient_balance",
        }
    }
}

/// Estado terminal de un intento de peaje: `completed` o `rejected:<motivo>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Completed,
    Rejected(RejectionReason),
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Completed => f.write_str("completed"),
            TransactionStatus::Rejected(reason) => write!(f, "rejected:{}", reason.as_str()),
        }
    }
}

/// Texto de estado almacenado que no corresponde a ningún `TransactionStatus`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction status '{0}'")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for TransactionStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "completed" => Ok(TransactionStatus::Completed),
            "rejected:insufficient_balance" => {
                Ok(TransactionStatus::Rejected(RejectionReason::InsufficientBalance))
            }
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TransactionStatus::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Transacción de peaje - mapea a la tabla toll_transactions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TollTransaction {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub checkpoint: String,
    pub scanner_id: String,
    pub rfid_tag: String,
    pub license_plate: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Transacción pendiente de persistir (el id lo asigna el store)
#[derive(Debug, Clone)]
pub struct NewTollTransaction {
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub checkpoint: String,
    pub scanner_id: String,
    pub rfid_tag: String,
    pub license_plate: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTollTransaction {
    pub fn into_record(self, id: Uuid) -> TollTransaction {
        TollTransaction {
            id,
            vehicle_id: self.vehicle_id,
            owner_id: self.owner_id,
            checkpoint: self.checkpoint,
            scanner_id: self.scanner_id,
            rfid_tag: self.rfid_tag,
            license_plate: self.license_plate,
            amount: self.amount,
            balance_before: self.balance_before,
            balance_after: self.balance_after,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Recarga de saldo - mapea a la tabla payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    pub fn into_record(self, id: Uuid) -> Payment {
        Payment {
            id,
            vehicle_id: self.vehicle_id,
            owner_id: self.owner_id,
            amount: self.amount,
            balance_after: self.balance_after,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_form() {
        assert_eq!(TransactionStatus::Completed.to_string(), "completed");
        assert_eq!(
            TransactionStatus::Rejected(RejectionReason::InsufficientBalance).to_string(),
            "rejected:insufficient_balance"
        );
    }

    #[test]
    fn test_status_parses_stored_text() {
        let parsed = TransactionStatus::try_from("rejected:insufficient_balance".to_string());
        assert_eq!(
            parsed,
            Ok(TransactionStatus::Rejected(RejectionReason::InsufficientBalance))
        );
        assert!(TransactionStatus::try_from("pending".to_string()).is_err());
    }
}
