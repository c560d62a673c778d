//! Owners, provisión de vehículos e historiales
//!
//! Operaciones CRUD finas sobre el Balance Store para el panel de
//! administración y el panel del propietario.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::error::{TollError, TollResult};
use crate::models::{money, NewOwner, NewVehicle, Owner, Payment, TollTransaction, Vehicle};
use crate::repositories::BalanceStore;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn BalanceStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn BalanceStore>) -> Self {
        Self { store }
    }

    pub async fn add_owner(&self, owner: NewOwner) -> TollResult<Owner> {
        let owner = self.store.add_owner(owner).await?;
        info!(owner_id = %owner.id, "👤 owner registered");
        Ok(owner)
    }

    pub async fn list_owners(&self) -> TollResult<Vec<Owner>> {
        Ok(self.store.list_owners().await?)
    }

    pub async fn get_owner(&self, owner_id: Uuid) -> TollResult<Owner> {
        self.store
            .get_owner(owner_id)
            .await?
            .ok_or(TollError::UnknownOwner { owner_id })
    }

    /// Provisiona un vehículo para un owner existente. La etiqueta RFID debe
    /// ser única; el store devuelve conflicto si ya está asignada.
    pub async fn provision_vehicle(&self, vehicle: NewVehicle) -> TollResult<Vehicle> {
        if vehicle.initial_balance < Decimal::ZERO || !money::is_storable(vehicle.initial_balance) {
            return Err(TollError::InvalidAmount { amount: vehicle.initial_balance });
        }
        self.get_owner(vehicle.owner_id).await?;

        let vehicle = self.store.insert_vehicle(vehicle).await?;
        info!(
            vehicle_id = %vehicle.id,
            rfid = %vehicle.rfid,
            license_plate = %vehicle.license_plate,
            "🚗 vehicle provisioned"
        );
        Ok(vehicle)
    }

    pub async fn owner_tolls(&self, owner_id: Uuid) -> TollResult<Vec<TollTransaction>> {
        Ok(self.store.transactions_for_owner(owner_id).await?)
    }

    pub async fn owner_payments(&self, owner_id: Uuid) -> TollResult<Vec<Payment>> {
        Ok(self.store.payments_for_owner(owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryBalanceStore;

    fn new_owner(email: &str) -> NewOwner {
        NewOwner {
            name: "Owner".to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_provision_requires_existing_owner() {
        let service = AccountService::new(Arc::new(MemoryBalanceStore::new()));
        let missing = Uuid::new_v4();

        let err = service
            .provision_vehicle(NewVehicle {
                owner_id: missing,
                rfid: "T1".to_string(),
                license_plate: "P1".to_string(),
                vehicle_type: None,
                initial_balance: Decimal::ZERO,
            })
            .await
            .unwrap_err();
        assert_eq!(err, TollError::UnknownOwner { owner_id: missing });
    }

    #[tokio::test]
    async fn test_duplicate_rfid_is_reported() {
        let service = AccountService::new(Arc::new(MemoryBalanceStore::new()));
        let owner = service.add_owner(new_owner("a@example.com")).await.unwrap();
        let vehicle = || NewVehicle {
            owner_id: owner.id,
            rfid: "SAME".to_string(),
            license_plate: "P1".to_string(),
            vehicle_type: None,
            initial_balance: Decimal::ZERO,
        };

        service.provision_vehicle(vehicle()).await.unwrap();
        let err = service.provision_vehicle(vehicle()).await.unwrap_err();
        assert!(matches!(err, TollError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_initial_balance_must_fit_the_column() {
        let service = AccountService::new(Arc::new(MemoryBalanceStore::new()));
        let owner = service.add_owner(new_owner("range@example.com")).await.unwrap();

        for initial_balance in [Decimal::new(-1, 0), Decimal::new(1, 3), Decimal::MAX] {
            let err = service
                .provision_vehicle(NewVehicle {
                    owner_id: owner.id,
                    rfid: "RANGE".to_string(),
                    license_plate: "P1".to_string(),
                    vehicle_type: None,
                    initial_balance,
                })
                .await
                .unwrap_err();
            assert_eq!(err, TollError::InvalidAmount { amount: initial_balance });
        }
    }

    #[tokio::test]
    async fn test_duplicate_owner_email() {
        let service = AccountService::new(Arc::new(MemoryBalanceStore::new()));
        service.add_owner(new_owner("dup@example.com")).await.unwrap();
        let err = service.add_owner(new_owner("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, TollError::Duplicate(_)));
    }
}
