//! Recargas de saldo
//!
//! Misma disciplina que el débito: lock por vehículo, lectura fresca y
//! escritura condicional de saldo + registro de pago en una sola unidad.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::{TollError, TollResult};
use super::vehicle_locks::VehicleLocks;
use crate::models::{money, NewPayment, Payment};
use crate::repositories::{BalanceStore, WriteOutcome};

#[derive(Clone)]
pub struct RechargeService {
    store: Arc<dyn BalanceStore>,
    locks: VehicleLocks,
    max_commit_attempts: u32,
}

impl RechargeService {
    pub fn new(store: Arc<dyn BalanceStore>, locks: VehicleLocks, max_commit_attempts: u32) -> Self {
        Self {
            store,
            locks,
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    pub async fn recharge(&self, vehicle_id: Uuid, amount: Decimal) -> TollResult<Payment> {
        if amount <= Decimal::ZERO || !money::is_storable(amount) {
            warn!(%vehicle_id, %amount, "recharge rejected: invalid amount");
            return Err(TollError::InvalidAmount { amount });
        }

        let _guard = self.locks.acquire(vehicle_id).await;

        for attempt in 1..=self.max_commit_attempts {
            let vehicle = self
                .store
                .get_vehicle(vehicle_id)
                .await?
                .ok_or(TollError::UnknownVehicle { vehicle_id })?;

            let balance_after = money::credit(vehicle.balance, amount).ok_or_else(|| {
                warn!(%vehicle_id, %amount, balance = %vehicle.balance, "recharge rejected: balance out of range");
                TollError::InvalidAmount { amount }
            })?;

            let payment = NewPayment {
                vehicle_id,
                owner_id: vehicle.owner_id,
                amount,
                balance_after,
                created_at: Utc::now(),
            };

            let outcome = self
                .store
                .commit_payment(vehicle.version, payment)
                .await
                .map_err(|e| {
                    error!(%vehicle_id, "recharge failed: {}", e);
                    TollError::Persistence(e.to_string())
                })?;

            match outcome {
                WriteOutcome::Committed(record) => {
                    info!(
                        payment_id = %record.id,
                        %vehicle_id,
                        amount = %record.amount,
                        balance_after = %record.balance_after,
                        "💰 balance recharged"
                    );
                    return Ok(record);
                }
                WriteOutcome::Conflict => {
                    warn!(%vehicle_id, attempt, "balance changed concurrently, retrying recharge");
                }
            }
        }

        error!(%vehicle_id, "recharge gave up after repeated write conflicts");
        Err(TollError::Persistence(format!(
            "recharge of vehicle {} kept conflicting after {} attempts",
            vehicle_id, self.max_commit_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewOwner, NewVehicle, Vehicle};
    use crate::repositories::MemoryBalanceStore;

    async fn fixture() -> (Arc<MemoryBalanceStore>, RechargeService, Vehicle) {
        let store = Arc::new(MemoryBalanceStore::new());
        let owner = store
            .add_owner(NewOwner {
                name: "Grace Njeri".to_string(),
                email: "grace@example.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        let vehicle = store
            .insert_vehicle(NewVehicle {
                owner_id: owner.id,
                rfid: "TAG-RC".to_string(),
                license_plate: "KDB 900R".to_string(),
                vehicle_type: None,
                initial_balance: Decimal::new(250, 2),
            })
            .await
            .unwrap();
        let service = RechargeService::new(store.clone(), VehicleLocks::new(), 3);
        (store, service, vehicle)
    }

    #[tokio::test]
    async fn test_recharge_adds_to_balance() {
        let (store, service, vehicle) = fixture().await;

        let payment = service.recharge(vehicle.id, Decimal::new(2000, 2)).await.unwrap();
        assert_eq!(payment.balance_after, Decimal::new(2250, 2));
        assert_eq!(payment.owner_id, vehicle.owner_id);

        let stored = store.get_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(2250, 2));
        assert_eq!(store.payments_for_vehicle(vehicle.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negative_amount_changes_nothing() {
        let (store, service, vehicle) = fixture().await;

        let err = service.recharge(vehicle.id, Decimal::new(-5, 0)).await.unwrap_err();
        assert_eq!(err, TollError::InvalidAmount { amount: Decimal::new(-5, 0) });

        let stored = store.get_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, vehicle.balance);
        assert!(store.payments_for_vehicle(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amount_beyond_two_decimals_is_rejected() {
        let (store, service, vehicle) = fixture().await;
        let amount = Decimal::new(1, 3);

        let err = service.recharge(vehicle.id, amount).await.unwrap_err();
        assert_eq!(err, TollError::InvalidAmount { amount });
        assert!(store.payments_for_vehicle(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huge_amount_is_rejected_without_overflow() {
        let (store, service, vehicle) = fixture().await;

        for amount in [Decimal::MAX, money::MAX_AMOUNT] {
            let err = service.recharge(vehicle.id, amount).await.unwrap_err();
            assert_eq!(err, TollError::InvalidAmount { amount });
        }

        let stored = store.get_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(250, 2));
        assert!(store.payments_for_vehicle(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_vehicle() {
        let (_, service, _) = fixture().await;
        let missing = Uuid::new_v4();
        let err = service.recharge(missing, Decimal::ONE).await.unwrap_err();
        assert_eq!(err, TollError::UnknownVehicle { vehicle_id: missing });
    }
}
