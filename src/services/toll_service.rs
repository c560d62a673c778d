//! Toll Processing Engine
//!
//! Pipeline de un escaneo: resolver etiqueta -> elegibilidad -> fondos ->
//! débito + registro. Los pasos de elegibilidad, fondos y débito corren bajo
//! el lock del vehículo y sobre una lectura fresca; el débito es una
//! escritura condicional por versión y, si pierde la carrera, se repite
//! desde la lectura con datos nuevos hasta `max_commit_attempts` veces.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::error::{TollError, TollResult};
use super::vehicle_directory::VehicleDirectory;
use super::vehicle_locks::VehicleLocks;
use crate::models::{
    money, NewTollTransaction, RejectionReason, ScanEvent, TollReceipt, TransactionStatus, Vehicle,
    VehicleStatus,
};
use crate::repositories::{BalanceStore, WriteOutcome};

#[derive(Clone)]
pub struct TollService {
    store: Arc<dyn BalanceStore>,
    directory: VehicleDirectory,
    locks: VehicleLocks,
    max_commit_attempts: u32,
}

impl TollService {
    pub fn new(
        store: Arc<dyn BalanceStore>,
        directory: VehicleDirectory,
        locks: VehicleLocks,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            store,
            directory,
            locks,
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    pub async fn process_scan(&self, event: ScanEvent) -> TollResult<TollReceipt> {
        if event.toll_amount <= Decimal::ZERO || !money::is_storable(event.toll_amount) {
            return Err(TollError::InvalidAmount { amount: event.toll_amount });
        }

        let resolved = match self.directory.find_by_rfid(&event.rfid_tag).await {
            Ok(vehicle) => vehicle,
            Err(e) => {
                warn!(rfid = %event.rfid_tag, checkpoint = %event.checkpoint_id, "scan rejected: {}", e);
                return Err(e);
            }
        };

        let _guard = self.locks.acquire(resolved.id).await;

        for attempt in 1..=self.max_commit_attempts {
            let vehicle = self
                .store
                .get_vehicle(resolved.id)
                .await?
                .ok_or_else(|| TollError::VehicleNotFound { rfid: event.rfid_tag.clone() })?;

            self.check_eligibility(&vehicle, &event).await?;

            let transaction = NewTollTransaction {
                vehicle_id: vehicle.id,
                owner_id: vehicle.owner_id,
                checkpoint: event.checkpoint_id.clone(),
                scanner_id: event.scanner_id.clone(),
                rfid_tag: event.rfid_tag.clone(),
                license_plate: vehicle.license_plate.clone(),
                amount: event.toll_amount,
                balance_before: vehicle.balance,
                balance_after: vehicle.balance - event.toll_amount,
                status: TransactionStatus::Completed,
                created_at: event.timestamp,
            };

            let outcome = self
                .store
                .commit_toll(vehicle.version, transaction)
                .await
                .map_err(|e| {
                    error!(vehicle_id = %vehicle.id, rfid = %event.rfid_tag, "toll debit failed: {}", e);
                    TollError::Persistence(e.to_string())
                })?;

            match outcome {
                WriteOutcome::Committed(record) => {
                    info!(
                        transaction_id = %record.id,
                        vehicle_id = %record.vehicle_id,
                        license_plate = %record.license_plate,
                        checkpoint = %record.checkpoint,
                        amount = %record.amount,
                        balance_after = %record.balance_after,
                        "✅ toll processed"
                    );
                    return Ok(TollReceipt {
                        transaction_id: record.id,
                        vehicle_id: record.vehicle_id,
                        license_plate: record.license_plate,
                        checkpoint: record.checkpoint,
                        toll_amount: record.amount,
                        previous_balance: record.balance_before,
                        new_balance: record.balance_after,
                        timestamp: record.created_at,
                    });
                }
                WriteOutcome::Conflict => {
                    warn!(vehicle_id = %vehicle.id, attempt, "balance changed concurrently, retrying debit");
                }
            }
        }

        error!(
            vehicle_id = %resolved.id,
            attempts = self.max_commit_attempts,
            "toll debit gave up after repeated write conflicts"
        );
        Err(TollError::Persistence(format!(
            "balance update for vehicle {} kept conflicting after {} attempts",
            resolved.id, self.max_commit_attempts
        )))
    }

    /// Estado activo y fondos suficientes. Un rechazo por saldo deja una
    /// transacción de auditoría sin mover el saldo.
    async fn check_eligibility(&self, vehicle: &Vehicle, event: &ScanEvent) -> TollResult<()> {
        if vehicle.status != VehicleStatus::Active {
            warn!(vehicle_id = %vehicle.id, status = %vehicle.status, "scan rejected: vehicle not active");
            return Err(TollError::VehicleNotActive {
                status: vehicle.status,
                license_plate: vehicle.license_plate.clone(),
            });
        }

        if vehicle.balance < event.toll_amount {
            warn!(
                vehicle_id = %vehicle.id,
                balance = %vehicle.balance,
                required = %event.toll_amount,
                "scan rejected: insufficient balance"
            );
            self.record_rejection(vehicle, event, RejectionReason::InsufficientBalance)
                .await;
            return Err(TollError::InsufficientBalance {
                balance: vehicle.balance,
                required: event.toll_amount,
                license_plate: vehicle.license_plate.clone(),
            });
        }

        Ok(())
    }

    async fn record_rejection(&self, vehicle: &Vehicle, event: &ScanEvent, reason: RejectionReason) {
        let audit = NewTollTransaction {
            vehicle_id: vehicle.id,
            owner_id: vehicle.owner_id,
            checkpoint: event.checkpoint_id.clone(),
            scanner_id: event.scanner_id.clone(),
            rfid_tag: event.rfid_tag.clone(),
            license_plate: vehicle.license_plate.clone(),
            amount: Decimal::ZERO,
            balance_before: vehicle.balance,
            balance_after: vehicle.balance,
            status: TransactionStatus::Rejected(reason),
            created_at: event.timestamp,
        };
        // El rechazo ya es la respuesta; perder el registro de auditoría solo se loguea
        if let Err(e) = self.store.append_transaction(audit).await {
            error!(vehicle_id = %vehicle.id, "could not record rejected toll attempt: {}", e);
        }
    }
}
