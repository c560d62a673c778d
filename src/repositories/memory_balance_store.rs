//! Balance Store en memoria
//!
//! Implementa el mismo contrato que el store PostgreSQL sobre un mapa
//! protegido por mutex. Se usa en modo desarrollo (sin DATABASE_URL) y en
//! los tests. Cada escritura condicional ocurre bajo un único lock, así que
//! saldo y registro se publican juntos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::balance_store::{BalanceStore, StoreError, StoreResult, WriteOutcome};
use crate::models::{
    NewOwner, NewPayment, NewTollTransaction, NewVehicle, Owner, Payment, TollTransaction,
    Vehicle, VehicleFields, VehicleStatus,
};

#[derive(Default)]
struct Inner {
    owners: Vec<Owner>,
    vehicles: Vec<Vehicle>,
    transactions: Vec<TollTransaction>,
    payments: Vec<Payment>,
}

impl Inner {
    fn vehicle_mut(&mut self, id: Uuid) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }
}

#[derive(Default)]
pub struct MemoryBalanceStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
    forced_conflicts: AtomicUsize,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula una caída del store: toda escritura falla con `Unavailable`
    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Las próximas `count` escrituras condicionales devuelven `Conflict`
    pub fn force_conflicts(&self, count: usize) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected by store".to_string()));
        }
        Ok(())
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Aplica el nuevo saldo si la versión coincide; devuelve false en conflicto
    fn swap_balance(
        &self,
        inner: &mut Inner,
        vehicle_id: Uuid,
        expected_version: i64,
        new_balance: rust_decimal::Decimal,
    ) -> bool {
        if self.take_forced_conflict() {
            return false;
        }
        match inner.vehicle_mut(vehicle_id) {
            Some(vehicle) if vehicle.version == expected_version => {
                vehicle.balance = new_balance;
                vehicle.version += 1;
                true
            }
            _ => false,
        }
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn get_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let inner = self.lock()?;
        Ok(inner.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn list_vehicles(&self) -> StoreResult<Vec<Vehicle>> {
        Ok(self.lock()?.vehicles.clone())
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> StoreResult<Vehicle> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        if inner.vehicles.iter().any(|v| v.rfid == vehicle.rfid) {
            return Err(StoreError::Conflict(format!(
                "RFID tag '{}' is already assigned",
                vehicle.rfid
            )));
        }
        let record = Vehicle {
            id: Uuid::new_v4(),
            owner_id: vehicle.owner_id,
            rfid: vehicle.rfid,
            license_plate: vehicle.license_plate,
            vehicle_type: vehicle.vehicle_type,
            balance: vehicle.initial_balance,
            status: VehicleStatus::Active,
            suspended_at: None,
            reactivated_at: None,
            version: 0,
            created_at: Utc::now(),
        };
        inner.vehicles.push(record.clone());
        Ok(record)
    }

    async fn update_vehicle_fields(
        &self,
        id: Uuid,
        expected_version: i64,
        fields: VehicleFields,
    ) -> StoreResult<WriteOutcome<Vehicle>> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        if self.take_forced_conflict() {
            return Ok(WriteOutcome::Conflict);
        }
        match inner.vehicle_mut(id) {
            Some(vehicle) if vehicle.version == expected_version => {
                let updated = fields.apply_to(vehicle);
                *vehicle = updated.clone();
                Ok(WriteOutcome::Committed(updated))
            }
            _ => Ok(WriteOutcome::Conflict),
        }
    }

    async fn commit_toll(
        &self,
        expected_version: i64,
        transaction: NewTollTransaction,
    ) -> StoreResult<WriteOutcome<TollTransaction>> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        if !self.swap_balance(
            &mut inner,
            transaction.vehicle_id,
            expected_version,
            transaction.balance_after,
        ) {
            return Ok(WriteOutcome::Conflict);
        }
        let record = transaction.into_record(Uuid::new_v4());
        inner.transactions.push(record.clone());
        Ok(WriteOutcome::Committed(record))
    }

    async fn commit_payment(
        &self,
        expected_version: i64,
        payment: NewPayment,
    ) -> StoreResult<WriteOutcome<Payment>> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        if !self.swap_balance(&mut inner, payment.vehicle_id, expected_version, payment.balance_after) {
            return Ok(WriteOutcome::Conflict);
        }
        let record = payment.into_record(Uuid::new_v4());
        inner.payments.push(record.clone());
        Ok(WriteOutcome::Committed(record))
    }

    async fn append_transaction(&self, transaction: NewTollTransaction) -> StoreResult<TollTransaction> {
        self.check_writable()?;
        let record = transaction.into_record(Uuid::new_v4());
        self.lock()?.transactions.push(record.clone());
        Ok(record)
    }

    async fn transactions_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<TollTransaction>> {
        let inner = self.lock()?;
        let items = inner
            .transactions
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |t: &TollTransaction| t.created_at))
    }

    async fn transactions_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<TollTransaction>> {
        let inner = self.lock()?;
        let items = inner
            .transactions
            .iter()
            .filter(|t| t.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |t: &TollTransaction| t.created_at))
    }

    async fn payments_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Payment>> {
        let inner = self.lock()?;
        let items = inner
            .payments
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |p: &Payment| p.created_at))
    }

    async fn payments_for_vehicle(&self, vehicle_id: Uuid) -> StoreResult<Vec<Payment>> {
        let inner = self.lock()?;
        let items = inner
            .payments
            .iter()
            .filter(|p| p.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |p: &Payment| p.created_at))
    }

    async fn get_owner(&self, id: Uuid) -> StoreResult<Option<Owner>> {
        Ok(self.lock()?.owners.iter().find(|o| o.id == id).cloned())
    }

    async fn list_owners(&self) -> StoreResult<Vec<Owner>> {
        Ok(self.lock()?.owners.clone())
    }

    async fn add_owner(&self, owner: NewOwner) -> StoreResult<Owner> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        if inner.owners.iter().any(|o| o.email.eq_ignore_ascii_case(&owner.email)) {
            return Err(StoreError::Conflict(format!(
                "Owner with email '{}' already exists",
                owner.email
            )));
        }
        let record = Owner {
            id: Uuid::new_v4(),
            name: owner.name,
            email: owner.email,
            phone: owner.phone,
            created_at: Utc::now(),
        };
        inner.owners.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionStatus;
    use rust_decimal::Decimal;

    async fn seeded() -> (MemoryBalanceStore, Vehicle) {
        let store = MemoryBalanceStore::new();
        let owner = store
            .add_owner(NewOwner {
                name: "Jane Wanjiku".to_string(),
                email: "jane@example.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        let vehicle = store
            .insert_vehicle(NewVehicle {
                owner_id: owner.id,
                rfid: "TAG-1".to_string(),
                license_plate: "KCB 001X".to_string(),
                vehicle_type: None,
                initial_balance: Decimal::new(1000, 2),
            })
            .await
            .unwrap();
        (store, vehicle)
    }

    fn debit(vehicle: &Vehicle, amount: Decimal) -> NewTollTransaction {
        NewTollTransaction {
            vehicle_id: vehicle.id,
            owner_id: vehicle.owner_id,
            checkpoint: "Toll Plaza B".to_string(),
            scanner_id: "SCN-1".to_string(),
            rfid_tag: vehicle.rfid.clone(),
            license_plate: vehicle.license_plate.clone(),
            amount,
            balance_before: vehicle.balance,
            balance_after: vehicle.balance - amount,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_toll_with_stale_version_conflicts() {
        let (store, vehicle) = seeded().await;

        let first = store
            .commit_toll(vehicle.version, debit(&vehicle, Decimal::new(750, 2)))
            .await
            .unwrap();
        assert!(first.is_committed());

        // Misma versión leída: debe perder la carrera sin escribir nada
        let second = store
            .commit_toll(vehicle.version, debit(&vehicle, Decimal::new(750, 2)))
            .await
            .unwrap();
        assert_eq!(second, WriteOutcome::Conflict);

        let stored = store.get_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(250, 2));
        assert_eq!(stored.version, vehicle.version + 1);
        assert_eq!(store.transactions_for_vehicle(vehicle.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rfid_is_rejected() {
        let (store, vehicle) = seeded().await;
        let result = store
            .insert_vehicle(NewVehicle {
                owner_id: vehicle.owner_id,
                rfid: "TAG-1".to_string(),
                license_plate: "KCB 002X".to_string(),
                vehicle_type: None,
                initial_balance: Decimal::ZERO,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_write_failure_leaves_state_untouched() {
        let (store, vehicle) = seeded().await;
        store.set_write_failure(true);

        let result = store
            .commit_toll(vehicle.version, debit(&vehicle, Decimal::new(100, 2)))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        let stored = store.get_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, vehicle.balance);
        assert!(store.transactions_for_vehicle(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forced_conflicts_are_consumed() {
        let (store, vehicle) = seeded().await;
        store.force_conflicts(1);

        let outcome = store
            .update_vehicle_fields(vehicle.id, vehicle.version, VehicleFields::default())
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Conflict);

        let outcome = store
            .update_vehicle_fields(vehicle.id, vehicle.version, VehicleFields::default())
            .await
            .unwrap();
        assert!(outcome.is_committed());
    }
}
