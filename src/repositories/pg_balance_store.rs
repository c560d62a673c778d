//! Balance Store sobre PostgreSQL
//!
//! Las escrituras de saldo usan `UPDATE ... WHERE id = $1 AND version = $2`
//! dentro de una transacción SQL junto con el INSERT del registro. Si la
//! transacción se abandona (timeout, cancelación) sqlx hace rollback al
//! soltarla, así que nunca queda un registro sin su saldo o viceversa.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::balance_store::{BalanceStore, StoreError, StoreResult, WriteOutcome};
use crate::models::{
    NewOwner, NewPayment, NewTollTransaction, NewVehicle, Owner, Payment, TollTransaction,
    Vehicle, VehicleFields, VehicleStatus,
};

const VEHICLE_COLUMNS: &str = "id, owner_id, rfid, license_plate, vehicle_type, balance, status, \
     suspended_at, reactivated_at, version, created_at";

const TRANSACTION_COLUMNS: &str = "id, vehicle_id, owner_id, checkpoint, scanner_id, rfid_tag, \
     license_plate, amount, balance_before, balance_after, status, created_at";

#[derive(Clone)]
pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mapea violaciones de unicidad a `StoreError::Conflict`
    fn map_insert_error(e: sqlx::Error, what: &str) -> StoreError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(format!("{} already exists", what));
            }
        }
        StoreError::Database(e)
    }

    async fn swap_balance(
        tx: &mut Transaction<'_, Postgres>,
        vehicle_id: Uuid,
        expected_version: i64,
        new_balance: Decimal,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE vehicles SET balance = $3, version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(vehicle_id)
        .bind(expected_version)
        .bind(new_balance)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn get_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let sql = format!("SELECT {} FROM vehicles WHERE id = $1", VEHICLE_COLUMNS);
        let vehicle = sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn list_vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        let sql = format!("SELECT {} FROM vehicles ORDER BY created_at ASC", VEHICLE_COLUMNS);
        let vehicles = sqlx::query_as::<_, Vehicle>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> StoreResult<Vehicle> {
        let sql = format!(
            "INSERT INTO vehicles (id, owner_id, rfid, license_plate, vehicle_type, balance, status, version, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8) RETURNING {}",
            VEHICLE_COLUMNS
        );
        let what = format!("Vehicle with RFID tag '{}'", vehicle.rfid);
        sqlx::query_as::<_, Vehicle>(&sql)
            .bind(Uuid::new_v4())
            .bind(vehicle.owner_id)
            .bind(vehicle.rfid)
            .bind(vehicle.license_plate)
            .bind(vehicle.vehicle_type)
            .bind(vehicle.initial_balance)
            .bind(VehicleStatus::Active)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_insert_error(e, &what))
    }

    async fn update_vehicle_fields(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: VehicleFields,
    ) -> StoreResult<WriteOutcome<Vehicle>> {
        // Los flags $n distinguen "no tocar" de "poner a NULL" en los timestamps
        let sql = format!(
            r#"
            UPDATE vehicles SET
                balance = COALESCE($3, balance),
                status = COALESCE($4, status),
                suspended_at = CASE WHEN $5 THEN $6 ELSE suspended_at END,
                reactivated_at = CASE WHEN $7 THEN $8 ELSE reactivated_at END,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        );
        let vehicle = sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(fields.balance)
            .bind(fields.status)
            .bind(fields.suspended_at.is_some())
            .bind(fields.suspended_at.flatten())
            .bind(fields.reactivated_at.is_some())
            .bind(fields.reactivated_at.flatten())
            .fetch_optional(&self.pool)
            .await?;

        Ok(match vehicle {
            Some(vehicle) => WriteOutcome::Committed(vehicle),
            None => {
                debug!(vehicle_id = %id, expected_version, "conditional vehicle update lost the race");
                WriteOutcome::Conflict
            }
        })
    }

    async fn commit_toll(
        &self,
        expected_version: i64,
        transaction: NewTollTransaction,
    ) -> StoreResult<WriteOutcome<TollTransaction>> {
        let mut tx = self.pool.begin().await?;

        if !Self::swap_balance(&mut tx, transaction.vehicle_id, expected_version, transaction.balance_after).await? {
            tx.rollback().await?;
            return Ok(WriteOutcome::Conflict);
        }

        let sql = format!(
            "INSERT INTO toll_transactions ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {cols}",
            cols = TRANSACTION_COLUMNS
        );
        let record = sqlx::query_as::<_, TollTransaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(transaction.vehicle_id)
            .bind(transaction.owner_id)
            .bind(&transaction.checkpoint)
            .bind(&transaction.scanner_id)
            .bind(&transaction.rfid_tag)
            .bind(&transaction.license_plate)
            .bind(transaction.amount)
            .bind(transaction.balance_before)
            .bind(transaction.balance_after)
            .bind(transaction.status.to_string())
            .bind(transaction.created_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(WriteOutcome::Committed(record))
    }

    async fn commit_payment(
        &self,
        expected_version: i64,
        payment: NewPayment,
    ) -> StoreResult<WriteOutcome<Payment>> {
        let mut tx = self.pool.begin().await?;

        if !Self::swap_balance(&mut tx, payment.vehicle_id, expected_version, payment.balance_after).await? {
            tx.rollback().await?;
            return Ok(WriteOutcome::Conflict);
        }

        let record = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, vehicle_id, owner_id, amount, balance_after, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, vehicle_id, owner_id, amount, balance_after, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.vehicle_id)
        .bind(payment.owner_id)
        .bind(payment.amount)
        .bind(payment.balance_after)
        .bind(payment.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(WriteOutcome::Committed(record))
    }

    async fn append_transaction(&self, transaction: NewTollTransaction) -> StoreResult<TollTransaction> {
        let sql = format!(
            "INSERT INTO toll_transactions ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {cols}",
            cols = TRANSACTION_COLUMNS
        );
        let record = sqlx::query_as::<_, TollTransaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(transaction.vehicle_id)
            .bind(transaction.owner_id)
            .bind(transaction.checkpoint)
            .bind(transaction.scanner_id)
            .bind(transaction.rfid_tag)
            .bind(transaction.license_plate)
            .bind(transaction.amount)
            .bind(transaction.balance_before)
            .bind(transaction.balance_after)
            .bind(transaction.status.to_string())
            .bind(transaction.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(record)
    }

    async fn transactions_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<TollTransaction>> {
        let sql = format!(
            "SELECT {} FROM toll_transactions WHERE owner_id = $1 ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, TollTransaction>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn transactions_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<TollTransaction>> {
        let sql = format!(
            "SELECT {} FROM toll_transactions WHERE vehicle_id = $1 ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, TollTransaction>(&sql)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn payments_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT id, vehicle_id, owner_id, amount, balance_after, created_at \
             FROM payments WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn payments_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT id, vehicle_id, owner_id, amount, balance_after, created_at \
             FROM payments WHERE vehicle_id = $1 ORDER BY created_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_owner(&self, id: Uuid) -> StoreResult<Option<Owner>> {
        Ok(sqlx::query_as::<_, Owner>(
            "SELECT id, name, email, phone, created_at FROM owners WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_owners(&self) -> StoreResult<Vec<Owner>> {
        Ok(sqlx::query_as::<_, Owner>(
            "SELECT id, name, email, phone, created_at FROM owners ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_owner(&self, owner: NewOwner) -> StoreResult<Owner> {
        let what = format!("Owner with email '{}'", owner.email);
        sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (id, name, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner.name)
        .bind(owner.email)
        .bind(owner.phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error(e, &what))
    }
}
