//! Contrato del Balance Store
//!
//! Persistencia de vehículos, owners y los logs append-only de peajes y pagos.
//! Toda escritura sobre un vehículo es condicional a la `version` leída
//! previamente; si otra escritura ganó la carrera el store devuelve
//! `WriteOutcome::Conflict` y no modifica nada.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    NewOwner, NewPayment, NewTollTransaction, NewVehicle, Owner, Payment, TollTransaction,
    Vehicle, VehicleFields,
};

/// Errores del Balance Store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Resultado de una escritura condicional
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    Committed(T),
    /// La versión esperada ya no coincide (o el vehículo desapareció)
    Conflict,
}

impl<T> WriteOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, WriteOutcome::Committed(_))
    }
}

#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;

    async fn list_vehicles(&self) -> StoreResult<Vec<Vehicle>>;

    /// Provisiona un vehículo; falla con `Conflict` si la etiqueta RFID ya existe
    async fn insert_vehicle(&self, vehicle: NewVehicle) -> StoreResult<Vehicle>;

    async fn update_vehicle_fields(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: VehicleFields,
    ) -> StoreResult<WriteOutcome<Vehicle>>;

    /// Escribe `balance_after` en el vehículo y agrega la transacción como
    /// una sola unidad atómica.
    async fn commit_toll(
        &self,
        expected_version: i64,
        transaction: NewTollTransaction,
    ) -> StoreResult<WriteOutcome<TollTransaction>>;

    /// Igual que `commit_toll` pero para una recarga
    async fn commit_payment(
        &self,
        expected_version: i64,
        payment: NewPayment,
    ) -> StoreResult<WriteOutcome<Payment>>;

    /// Agrega una transacción sin tocar el saldo (intentos rechazados)
    async fn append_transaction(&self, transaction: NewTollTransaction) -> StoreResult<TollTransaction>;

    async fn transactions_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<TollTransaction>>;

    async fn transactions_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<TollTransaction>>;

    async fn payments_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Payment>>;

    async fn payments_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Payment>>;

    async fn get_owner(&self, id: Uuid) -> StoreResult<Option<Owner>>;

    async fn list_owners(&self) -> StoreResult<Vec<Owner>>;

    /// Registra un owner; falla con `Conflict` si el email ya existe
    async fn add_owner(&self, owner: NewOwner) -> StoreResult<Owner>;
}
